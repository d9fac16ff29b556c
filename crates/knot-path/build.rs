use std::{
    env,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

// Emits one `snapshot_case!` invocation per `test-data/**/*.moves` file; the
// macro itself lives in `src/tests.rs`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let data_dir = manifest_dir.join("test-data");
    println!("cargo:rerun-if-changed={}", data_dir.display());

    let mut cases = Vec::new();
    find_cases(&data_dir, &mut cases)?;
    cases.sort();

    let mut generated = String::new();
    for case in &cases {
        let name = case
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| format!("non UTF-8 file name: {}", case.display()))?;
        let input = case.strip_prefix(&manifest_dir)?;
        let dir = input.parent().unwrap_or(Path::new("test-data"));

        writeln!(
            generated,
            "snapshot_case!({}, {:?}, {:?}, {:?});",
            test_ident(name),
            name,
            slash_path(input),
            slash_path(dir),
        )?;
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    fs::write(out_dir.join("generated_tests.rs"), generated)?;
    Ok(())
}

fn find_cases(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            println!("cargo:rerun-if-changed={}", path.display());
            find_cases(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "moves") {
            println!("cargo:rerun-if-changed={}", path.display());
            out.push(path);
        }
    }
    Ok(())
}

fn test_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !ident.starts_with(|c: char| c.is_ascii_alphabetic()) {
        ident.insert_str(0, "case_");
    }
    ident
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
