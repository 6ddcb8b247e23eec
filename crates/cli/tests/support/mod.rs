#![allow(dead_code)]

use std::fs;
use std::path::Path;

use bisect_core::config::BisectLayout;
use serde_json::json;

/// Jest-style suite with `n` cases named `case 1..=n`, alternating `it`/`test`.
pub fn suite(n: usize) -> String {
    let mut out = String::from("import { useStore } from '../store';\n\ndescribe('store', () => {\n");
    for i in 1..=n {
        let keyword = if i % 2 == 1 { "it" } else { "test" };
        out.push_str(&format!("  {keyword}('case {i}', () => {{\n    expect({i}).toBe({i});\n  }});\n"));
    }
    out.push_str("});\n");
    out
}

/// Write `suite.test.ts` and a config whose runner is `sh -c <script> sh <file> [flag filter]`.
pub fn write_project(root: &Path, cases: usize, script: &str, strategy: &str) {
    fs::write(root.join("suite.test.ts"), suite(cases)).expect("write suite");

    let layout = BisectLayout::new(root);
    fs::create_dir_all(&layout.meta_dir).expect("create meta dir");
    let config = json!({
        "source": "suite.test.ts",
        "strategy": strategy,
        "runner": {
            "program": "sh",
            "args": ["-c", script, "sh", "{file}"],
            "filter_flag": "--testNamePattern",
            "echo_output": false
        }
    });
    fs::write(&layout.config_json_path, serde_json::to_string_pretty(&config).expect("json"))
        .expect("write config");
}

/// Fails when case 7 is still active in the skip-rewritten file.
pub const FAILS_FROM_CASE_7: &str = r#"if grep -q "it('case 7'" "$1"; then exit 1; fi; exit 0"#;

/// Fails when the name filter selects case 7.
pub const FILTER_FAILS_FROM_CASE_7: &str = r#"case "$3" in *"case 7"*) exit 1;; esac; exit 0"#;

pub const ALWAYS_PASSES: &str = "exit 0";
