//! Testbench memory images.
//!
//! The testbench preloads RAM from a `$readmemh` file: one 32-bit word per
//! line, in address order, each word the little-endian packing of four
//! consecutive image bytes. The file covers the whole RAM so that `.bss` and
//! both stacks start out zeroed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cargo_toml::Manifest;
use clap::Args;
use serde::Deserialize;

use crate::sh::{ShOptionsBuilder, StreamMode};

const WORD_BYTES: usize = 4;

/// Build a demo for the testbench and write its memory image
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Package to build
    #[arg(short = 'p', long = "package")]
    pub package: String,

    /// Target triple
    #[arg(long, default_value = "riscv32i-unknown-none-elf")]
    pub target: String,

    /// Build with the release profile
    #[arg(long)]
    pub release: bool,

    /// Comma-separated features to enable
    #[arg(long)]
    pub features: Option<String>,

    /// objcopy used to flatten the ELF
    #[arg(long, env = "OBJCOPY", default_value = "llvm-objcopy")]
    pub objcopy: String,

    /// Output file (defaults to `<profile dir>/<package>.hex`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageMetadata {
    merlin: Option<MerlinMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct MerlinMetadata {
    /// RAM size as a size string, e.g. `"64KiB"`.
    ram_size: String,
}

/// Manifest path of the workspace member named `package`.
fn find_member(root: &Path, package: &str) -> Result<PathBuf> {
    let workspace = Manifest::from_path(root.join("Cargo.toml"))
        .with_context(|| format!("failed to read {}", root.join("Cargo.toml").display()))?;
    let members = workspace
        .workspace
        .map(|ws| ws.members)
        .unwrap_or_default();

    for member in members {
        let path = root.join(&member).join("Cargo.toml");
        let manifest = Manifest::from_path(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if manifest.package.is_some_and(|p| p.name == package) {
            return Ok(path);
        }
    }
    bail!("no workspace member named `{package}`")
}

/// RAM size in bytes from `[package.metadata.merlin] ram-size`.
fn ram_size(manifest_path: &Path) -> Result<usize> {
    let manifest = Manifest::<PackageMetadata>::from_path_with_metadata(manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let merlin = manifest
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.merlin)
        .with_context(|| {
            format!(
                "{} has no [package.metadata.merlin] table",
                manifest_path.display()
            )
        })?;

    let bytes = parse_size::parse_size(&merlin.ram_size)
        .with_context(|| format!("invalid ram-size `{}`", merlin.ram_size))?;
    let bytes = usize::try_from(bytes).context("ram-size does not fit in usize")?;
    if bytes % WORD_BYTES != 0 {
        bail!("ram-size {bytes} is not a whole number of words");
    }
    Ok(bytes)
}

/// Little-endian words of `image`, zero-padded to `ram_bytes`.
fn pack_words(image: &[u8], ram_bytes: usize) -> Result<Vec<u32>> {
    if image.len() > ram_bytes {
        bail!(
            "image is {} bytes but RAM holds only {} bytes",
            image.len(),
            ram_bytes
        );
    }

    let mut words = Vec::with_capacity(ram_bytes / WORD_BYTES);
    for chunk in image.chunks(WORD_BYTES) {
        let mut bytes = [0u8; WORD_BYTES];
        bytes[..chunk.len()].copy_from_slice(chunk);
        words.push(u32::from_le_bytes(bytes));
    }
    words.resize(ram_bytes / WORD_BYTES, 0);
    Ok(words)
}

fn write_hex<W: Write>(words: &[u32], out: &mut W) -> Result<()> {
    for word in words {
        writeln!(out, "{word:08x}")?;
    }
    Ok(())
}

pub fn run(args: ImageArgs) -> Result<()> {
    let root = crate::findup::workspace_root()?;
    let manifest = find_member(&root, &args.package)?;
    let ram_bytes = ram_size(&manifest)?;

    let profile = if args.release { "release" } else { "debug" };
    let mut build = format!(
        "cargo build -p {} --target {}",
        args.package, args.target
    );
    if args.release {
        build.push_str(" --release");
    }
    if let Some(features) = &args.features {
        build.push_str(&format!(" --features \"{features}\""));
    }

    let opts = ShOptionsBuilder::default()
        .cwd(Some(root.clone()))
        .build()?;
    crate::sh!(options(&opts), &build)?;

    let profile_dir = root.join("target").join(&args.target).join(profile);
    let elf = profile_dir.join(&args.package);
    let scratch = tempfile::tempdir().context("failed to create a scratch directory")?;
    let flat = scratch.path().join(format!("{}.bin", args.package));

    let quiet = ShOptionsBuilder::default()
        .cwd(Some(root.clone()))
        .stdout(StreamMode::Null)
        .quiet(true)
        .build()?;
    crate::sh!(
        options(&quiet),
        format!(
            "{} -O binary {} {}",
            args.objcopy,
            elf.display(),
            flat.display()
        )
    )?;

    let image = fs::read(&flat).with_context(|| format!("failed to read {}", flat.display()))?;
    let words = pack_words(&image, ram_bytes)?;

    let output = args
        .output
        .unwrap_or_else(|| profile_dir.join(format!("{}.hex", args.package)));
    let mut file = fs::File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_hex(&words, &mut file)?;

    log::info!(
        "[image] {} bytes of {} -> {} ({} words)",
        image.len(),
        args.package,
        output.display(),
        words.len()
    );
    Ok(())
}
