// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `config.toml` override rewriting and genesis replacement, grounded on
//! `node/init.go`'s two-phase init and `config/config.go`'s override keys.
//! Deliberately naive per the original tool's own approach: a line-prefix
//! scan, not a TOML parse/re-serialize round trip, so comments and
//! untouched keys survive byte-for-byte.

use std::path::Path;

use crate::error::NodeError;

/// The four keys `init` overrides after a fresh `{daemon} init`, and the
/// literal value each is rewritten to.
fn overrides(moniker: &str) -> [(&'static str, String); 4] {
    [
        ("moniker", format!("\"{moniker}\"")),
        ("addr_book_strict", "false".to_string()),
        ("unsafe", "true".to_string()),
        ("log_level", "\"*:error\"".to_string()),
    ]
}

/// Rewrites `contents` line by line: a line whose trimmed left-hand side
/// (up to the first `=`) matches one of [`overrides`]'s keys is replaced
/// with `key = value`; every other line, including comments and blank
/// lines, is preserved verbatim.
pub fn rewrite_config(contents: &str, moniker: &str) -> String {
    let overrides = overrides(moniker);
    let mut out = String::with_capacity(contents.len());
    for line in contents.split_inclusive('\n') {
        let trimmed_end = line.trim_end_matches(['\n', '\r']);
        let lhs = trimmed_end.split('=').next().unwrap_or("").trim();

        if let Some((key, value)) = overrides.iter().find(|(key, _)| *key == lhs) {
            let suffix = if line.ends_with('\n') { "\n" } else { "" };
            out.push_str(&format!("{key} = {value}{suffix}"));
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Applies [`rewrite_config`] to the config file at `config_path` in place.
pub fn apply_overrides(config_path: &Path, moniker: &str) -> Result<(), NodeError> {
    let contents = std::fs::read_to_string(config_path).map_err(|source| NodeError::ReadConfig {
        path: config_path.display().to_string(),
        source,
    })?;
    let rewritten = rewrite_config(&contents, moniker);
    std::fs::write(config_path, rewritten).map_err(|source| NodeError::WriteConfig {
        path: config_path.display().to_string(),
        source,
    })
}

/// Overwrites the on-disk genesis file with `genesis`, truncating first.
pub fn write_genesis(genesis_path: &Path, genesis: &[u8]) -> Result<(), NodeError> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(genesis_path)
        .map_err(|source| NodeError::WriteGenesis {
            path: genesis_path.display().to_string(),
            source,
        })?;
    file.write_all(genesis)
        .map_err(|source| NodeError::WriteGenesis {
            path: genesis_path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_known_keys_preserving_unknown_lines() {
        let original = "\
# comment stays\n\
moniker = \"old-name\"\n\
addr_book_strict = true\n\
unsafe = false\n\
log_level = \"info\"\n\
custom_key = \"untouched\"\n";

        let rewritten = rewrite_config(original, "new-host");

        assert!(rewritten.contains("# comment stays\n"));
        assert!(rewritten.contains("moniker = \"new-host\"\n"));
        assert!(rewritten.contains("addr_book_strict = false\n"));
        assert!(rewritten.contains("unsafe = true\n"));
        assert!(rewritten.contains("log_level = \"*:error\"\n"));
        assert!(rewritten.contains("custom_key = \"untouched\"\n"));
    }

    #[test]
    fn ignores_keys_with_matching_substring_but_different_trimmed_lhs() {
        let original = "not_moniker = \"x\"\n";
        let rewritten = rewrite_config(original, "host");
        assert_eq!(rewritten, original);
    }

    #[test]
    fn preserves_file_without_trailing_newline() {
        let original = "moniker = \"old\"";
        let rewritten = rewrite_config(original, "new");
        assert_eq!(rewritten, "moniker = \"new\"");
    }
}
