//! `quill` (ql) - plain-text issue tracker
//!
//! Issues are YAML files in a directory next to your code; releases and
//! components live in one project record beside them.

use quill::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
