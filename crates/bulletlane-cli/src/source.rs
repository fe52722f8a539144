//! Bullet text sources: files, stdin, or the built-in sample.

use std::path::Path;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

const SAMPLE: &[&str] = &[
    "first!",
    "this part again",
    "hello from lane zero",
    "弹幕测试",
    "lol",
    "who is watching in 2026",
    "the timing on this is perfect",
    "wait what just happened",
    "ok this is my favourite scene",
    "🎉🎉🎉",
    "subtitles please",
    "same",
];

pub fn sample_lines() -> Vec<String> {
    SAMPLE.iter().map(|line| line.to_string()).collect()
}

pub async fn read_file(path: &Path) -> Result<Vec<String>> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))?;
    read_lines_from(BufReader::new(file)).await
}

pub async fn read_stdin() -> Result<Vec<String>> {
    read_lines_from(BufReader::new(tokio::io::stdin())).await
}

/// Trimmed non-empty lines, in order
pub async fn read_lines_from<R>(reader: R) -> Result<Vec<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut out = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_lines_skips_blank_lines() {
        let input: &[u8] = b"first\n\n   second  \r\n\nthird";
        let lines = read_lines_from(input).await.unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let missing = std::env::temp_dir().join("bulletlane-does-not-exist.txt");
        assert!(read_file(&missing).await.is_err());
    }

    #[test]
    fn test_sample_is_not_empty() {
        assert!(!sample_lines().is_empty());
    }
}
