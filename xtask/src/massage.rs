use anyhow::Result;
use clap::Args;

/// Massage packages by running cargo fix, clippy, fmt, check, and test
#[derive(Args, Debug)]
pub struct MassageArgs {
    #[command(flatten)]
    workspace: clap_cargo::Workspace,

    /// Enable verbose output (show warnings)
    #[arg(long = "verbose")]
    pub verbose: bool,
}

fn target_flags(workspace: &clap_cargo::Workspace) -> String {
    if workspace.workspace || workspace.package.is_empty() {
        "--workspace".to_string()
    } else {
        workspace
            .package
            .iter()
            .map(|p| format!("-p {p}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn run(args: MassageArgs) -> Result<()> {
    let target_flags = target_flags(&args.workspace);

    // Host pass only: firmware-only code is gated on the RISC-V target and
    // the crates' tests run against the recording doubles.
    let script = format!(
        r#"
set -e

echo [1/5] Running cargo fix...
cargo fix --allow-dirty --allow-staged --quiet {target_flags}

echo [2/5] Running cargo clippy --fix...
cargo clippy --fix --allow-dirty --allow-staged --quiet {target_flags}

echo [3/5] Running cargo fmt...
cargo fmt --all --quiet

echo [4/5] Running cargo check...
cargo check --quiet {target_flags}

echo [5/5] Running cargo test...
RUST_BACKTRACE=1 cargo nextest run --no-tests pass {target_flags}
"#
    );

    let opts = crate::sh::ShOptions {
        quiet: !args.verbose,
        cwd: Some(crate::findup::workspace_root()?),
        ..Default::default()
    };
    crate::sh!(options(opts), script)?;
    Ok(())
}
