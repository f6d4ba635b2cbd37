use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

const LINK_SCRIPT: &str = include_str!("link.x");

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=link.x");

    // Host builds link as ordinary programs.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("none") {
        return Ok(());
    }

    let out = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR not set"))?;
    fs::write(out.join("link.x"), LINK_SCRIPT)?;
    println!("cargo:rustc-link-search={}", out.display());
    Ok(())
}
