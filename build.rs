use anyhow::Result;
use vergen::EmitBuilder;

// Git metadata for `fc_dump_parser --version`
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    EmitBuilder::builder()
        .git_sha(true)
        .git_commit_date()
        .emit()?;
    Ok(())
}
