use std::env;
use std::fs;
use std::path::Path;

const TOKENS_FILE: &str = "tokenizer-tokens.bin";
const MERGES_FILE: &str = "tokenizer-bpe.bin";
const ENCODER_JSON: &str = "encoder.json";
const VOCAB_BPE: &str = "vocab.bpe";

fn main() {
    println!("cargo:rerun-if-env-changed=TOKENBUDGET_DATA");

    let out_dir = env::var("OUT_DIR").unwrap();
    build_embedded_data(&out_dir);
}

/// Embeds the tokenizer resources named by `TOKENBUDGET_DATA`, if any.
///
/// The directory may hold the ready-made null-delimited token list and merge
/// list, or the upstream `encoder.json` / `vocab.bpe` pair, in which case the
/// JSON mapping is flattened into the token list here.
fn build_embedded_data(out_dir: &str) {
    let out = Path::new(out_dir);
    let mut codegen = String::new();

    let data_dir = env::var("TOKENBUDGET_DATA").ok();
    let found = data_dir.as_deref().and_then(|dir| {
        let dir = Path::new(dir);
        println!("cargo:rerun-if-changed={}", dir.display());

        let merges = [MERGES_FILE, VOCAB_BPE]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())?;

        let tokens_bin = dir.join(TOKENS_FILE);
        let tokens = if tokens_bin.exists() {
            fs::read(&tokens_bin)
                .unwrap_or_else(|e| panic!("cannot read {}: {}", tokens_bin.display(), e))
        } else {
            let json = dir.join(ENCODER_JSON);
            if !json.exists() {
                return None;
            }
            convert_encoder_json(&json)
        };
        Some((tokens, merges))
    });

    match found {
        Some((tokens, merges)) => {
            let tokens_dest = out.join(TOKENS_FILE);
            fs::write(&tokens_dest, &tokens).expect("Failed to write token list");
            codegen.push_str(&format!(
                "pub const TOKENS: Option<&[u8]> = Some(include_bytes!(\"{}\"));\n",
                tokens_dest.display()
            ));
            let merges_dest = out.join(MERGES_FILE);
            fs::copy(&merges, &merges_dest)
                .unwrap_or_else(|e| panic!("cannot copy {}: {}", merges.display(), e));
            codegen.push_str(&format!(
                "pub const MERGES: Option<&[u8]> = Some(include_bytes!(\"{}\"));\n",
                merges_dest.display()
            ));
        }
        None => {
            codegen.push_str("pub const TOKENS: Option<&[u8]> = None;\n");
            codegen.push_str("pub const MERGES: Option<&[u8]> = None;\n");
        }
    }

    let dest = out.join("embedded_data.rs");
    fs::write(&dest, &codegen).expect("Failed to write embedded_data.rs");
}

/// Turns a `{"token": id, ...}` mapping into tokens joined by NUL, ordered by id.
/// Ids missing from the mapping become empty entries.
fn convert_encoder_json(path: &Path) -> Vec<u8> {
    let data = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    let root: serde_json::Value =
        serde_json::from_str(&data).unwrap_or_else(|e| panic!("invalid JSON: {e}"));
    let mapping = root.as_object().expect("encoder.json must be an object");

    let max = mapping
        .values()
        .filter_map(|v| v.as_u64())
        .max()
        .unwrap_or(0) as usize;

    let mut tokens: Vec<&str> = vec![""; max + 1];
    for (token, id) in mapping {
        if let Some(id) = id.as_u64() {
            tokens[id as usize] = token.as_str();
        }
    }

    let mut blob = Vec::with_capacity(data.len());
    for token in tokens {
        blob.extend_from_slice(token.as_bytes());
        blob.push(0);
    }
    blob
}
