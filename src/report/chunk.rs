//! Splitting a report into size-limited messages
//!
//! Chunks are packed greedily from whole sections (a section starts at a
//! separator line). A section that does not fit in an empty chunk is packed
//! line by line, and a line longer than the limit is cut at the limit.
//! A line's newline counts towards its length: a line of exactly the limit
//! is cut before its newline, which then opens the next chunk.
//! Concatenating the chunks yields the original report. Lengths are counted
//! in characters.

use super::SEPARATOR;

/// Split `report` into chunks of at most `max_len` characters
pub fn chunk_report(report: &str, max_len: usize) -> Vec<String> {
    let mut chunker = Chunker::new(max_len.max(1));
    for section in split_sections(report) {
        chunker.push_section(section);
    }
    chunker.finish()
}

/// Slices of `report`, each starting at a separator line except the first
fn split_sections(report: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in report.split_inclusive('\n') {
        if offset > start && line.trim_end_matches(['\r', '\n']) == SEPARATOR {
            sections.push(&report[start..offset]);
            start = offset;
        }
        offset += line.len();
    }

    if start < report.len() {
        sections.push(&report[start..]);
    }

    sections
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

struct Chunker {
    max_len: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl Chunker {
    fn new(max_len: usize) -> Self {
        Self {
            max_len,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn append(&mut self, text: &str, len: usize) {
        self.current.push_str(text);
        self.current_len += len;
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn push_section(&mut self, section: &str) {
        let len = char_len(section);
        if self.current_len + len <= self.max_len {
            self.append(section, len);
            return;
        }

        self.flush();
        if len <= self.max_len {
            self.append(section, len);
            return;
        }

        for line in section.split_inclusive('\n') {
            self.push_line(line);
        }
    }

    fn push_line(&mut self, line: &str) {
        let len = char_len(line);
        if self.current_len + len <= self.max_len {
            self.append(line, len);
            return;
        }

        self.flush();
        if len <= self.max_len {
            self.append(line, len);
            return;
        }

        let mut rest = line;
        while !rest.is_empty() {
            let cut = rest
                .char_indices()
                .nth(self.max_len)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let (piece, tail) = rest.split_at(cut);
            self.append(piece, char_len(piece));
            if !tail.is_empty() {
                self.flush();
            }
            rest = tail;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> String {
        let mut report = String::from("DOWNLOADS - Release\n");
        for platform in ["MS Windows", "MacOS", "Linux"] {
            report.push_str(SEPARATOR);
            report.push('\n');
            report.push_str(platform);
            report.push_str("\n\n");
            for i in 0..4 {
                report.push_str(&format!("{} entry {}\nhttps://dl.example.org/{}\n\n", platform, i, i));
            }
        }
        report.push_str(SEPARATOR);
        report.push('\n');
        report
    }

    #[test]
    fn test_small_report_is_one_chunk() {
        let report = sample_report();
        let chunks = chunk_report(&report, 10_000);
        assert_eq!(chunks, vec![report]);
    }

    #[test]
    fn test_chunks_respect_limit_and_reassemble() {
        let report = sample_report();
        for max_len in [1, 7, 50, 120, 250, 400, 2000] {
            let chunks = chunk_report(&report, max_len);
            assert!(chunks.iter().all(|c| c.chars().count() <= max_len), "max_len {}", max_len);
            assert!(chunks.iter().all(|c| !c.is_empty()));
            assert_eq!(chunks.concat(), report, "max_len {}", max_len);
        }
    }

    #[test]
    fn test_breaks_at_separator_when_sections_fit() {
        let report = sample_report();
        let sections = split_sections(&report);
        let largest = sections.iter().map(|s| s.chars().count()).max().unwrap();

        let chunks = chunk_report(&report, largest);
        for chunk in &chunks[1..] {
            assert!(chunk.starts_with(SEPARATOR), "chunk does not start at a separator: {:?}", chunk);
        }
    }

    #[test]
    fn test_lines_not_split_when_they_fit() {
        let report = sample_report();
        let chunks = chunk_report(&report, 150);
        for chunk in &chunks {
            assert!(chunk.ends_with('\n'));
        }
    }

    #[test]
    fn test_overlong_line_is_hard_cut() {
        let long_line = "x".repeat(25);
        let chunks = chunk_report(&long_line, 10);
        assert_eq!(chunks, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn test_line_of_exact_limit_carries_newline_forward() {
        let report = format!("head\n{}\nbody\n", SEPARATOR);
        let chunks = chunk_report(&report, SEPARATOR.chars().count());
        assert_eq!(
            chunks,
            vec!["head\n".to_string(), SEPARATOR.to_string(), "\nbody\n".to_string()]
        );
        assert_eq!(chunks.concat(), report);
    }

    #[test]
    fn test_hard_cut_respects_char_boundaries() {
        let text = "ééééé";
        let chunks = chunk_report(text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_split_sections() {
        let report = format!("head\n{sep}\na\n{sep}\nb\n", sep = SEPARATOR);
        let sections = split_sections(&report);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0], "head\n");
        assert!(sections[1].starts_with(SEPARATOR));
        assert_eq!(sections.concat(), report);
    }

    #[test]
    fn test_empty_report() {
        assert!(chunk_report("", 100).is_empty());
    }
}
