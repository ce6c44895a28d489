//! Relabel pass: replace generated solid names with row identifiers.
//!
//! The merged file names body `k` of `n` as `'<prefix> <n+1>.<k>'`. The
//! pass is a plain text substitution over the exported file.

use std::path::Path;

use glomet_kernel::glomet_kernel_step::{generated_label, quote};

/// Replace the generated name of the k-th body with `labels[k]`.
pub fn relabel(text: &str, prefix: &str, labels: &[&str]) -> String {
    let count = labels.len() + 1;
    labels
        .iter()
        .enumerate()
        .fold(text.to_string(), |acc, (k, label)| {
            let generated = quote(&generated_label(prefix, count, k + 1));
            acc.replace(&generated, &quote(label))
        })
}

/// Apply [`relabel`] to a file in place.
pub fn relabel_file(path: &Path, prefix: &str, labels: &[&str]) -> std::io::Result<()> {
    let text = std::fs::read_to_string(path)?;
    std::fs::write(path, relabel(&text, prefix, labels))
}
