use std::collections::BTreeSet;
use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const ENV_PREFIX: &str = "RXCHECK_";

/// Read by rxcheck but outside its own prefix.
const FOREIGN_ENV_KEYS: &[&str] = &["GEMINI_API_KEY"];

fn source_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Identifiers such as `RXCHECK_MODEL`. Longer identifiers that merely
/// contain the prefix are a different token and are skipped.
fn env_keys_in(source: &str) -> impl Iterator<Item = &str> {
    source
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| {
            token.len() > ENV_PREFIX.len()
                && token.starts_with(ENV_PREFIX)
                && token
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
        })
}

fn render_env_keys(keys: &BTreeSet<String>) -> String {
    let mut out = String::from("/// Environment variables rxcheck reads.\n");
    out.push_str("pub const ENV_KEYS: &[&str] = &[\n");
    for key in keys {
        out.push_str(&format!("    {key:?},\n"));
    }
    out.push_str("];\n");
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut keys: BTreeSet<String> = FOREIGN_ENV_KEYS.iter().map(|k| k.to_string()).collect();
    for file in source_files(Path::new("src"))? {
        let content = fs::read_to_string(&file)?;
        keys.extend(env_keys_in(&content).map(str::to_string));
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    fs::write(out_dir.join("env_keys.rs"), render_env_keys(&keys))?;

    let built_at = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
    let version = env::var("CARGO_PKG_VERSION")?;
    println!(
        "cargo:rustc-env=BUILD_ID={version}+{:x}.{:x}",
        built_at.as_secs(),
        built_at.subsec_nanos()
    );
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src");
    Ok(())
}
