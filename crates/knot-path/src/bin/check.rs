use std::{env, fs, process::ExitCode};

// Parse each move file and report its segment count and whether it closes.
fn main() -> ExitCode {
    let files: Vec<String> = env::args().skip(1).collect();
    if files.is_empty() {
        eprintln!("usage: check <file> [<file>...]");
        return ExitCode::FAILURE;
    }

    let mut failed = 0usize;
    for file in &files {
        let input = match fs::read_to_string(file) {
            Ok(s) => s,
            Err(err) => {
                eprintln!("{file}: read error: {err}");
                failed += 1;
                continue;
            }
        };

        match knot_path::parse(&input) {
            Ok(path) => {
                let shape = if path.is_closed(1e-9) { "closed" } else { "open" };
                println!("OK {file}: {} segments, {shape}", path.len());
            }
            Err(err) => {
                println!("ERR {file}: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
