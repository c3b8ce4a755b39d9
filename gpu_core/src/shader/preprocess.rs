/// Shader source preprocessing
///
/// Injects `#define` lines into pre-resolved shader source. The shading
/// language requires `#version` to precede everything but comments, so the
/// defines go right after the version line.

use crate::{engine_assert, engine_assert_fail};

const SOURCE: &str = "gpu::ShaderManager";
const VERSION_DIRECTIVE: &str = "#version";

/// Insert one `#define` line per entry of `defines` after the `#version` line
///
/// Without defines the source is returned unchanged. With defines, the text
/// before the directive is kept, the whole version line (including a profile
/// suffix such as `core`) is re-emitted, then the defines, then the rest of the
/// source verbatim.
///
/// A missing `#version`, or one without a number, is a contract violation.
///
/// # Example
///
/// ```
/// use gpu_core::gpu::shader::preprocess_source;
///
/// let out = preprocess_source("#version 450\nvoid main(){}", &["FOO", "BAR 1"]);
/// assert_eq!(out, "#version 450\n#define FOO\n#define BAR 1\nvoid main(){}");
/// ```
pub fn preprocess_source(source: &str, defines: &[&str]) -> String {
    if defines.is_empty() {
        return source.to_string();
    }

    let Some(directive) = find_version_directive(source) else {
        engine_assert_fail!(SOURCE, "Shader source has {} define(s) but no {} directive", defines.len(), VERSION_DIRECTIVE);
    };

    let (line_end, rest_start) = match source[directive..].find('\n') {
        Some(offset) => (directive + offset, directive + offset + 1),
        None => (source.len(), source.len()),
    };
    let version_line = source[directive..line_end].trim_end_matches('\r');

    let version_number = version_line[VERSION_DIRECTIVE.len()..].trim_start_matches([' ', '\t']);
    engine_assert!(
        version_number.starts_with(|c: char| c.is_ascii_digit()),
        SOURCE,
        "Malformed version directive: '{}'",
        version_line
    );

    let defines_len: usize = defines.iter().map(|define| define.len() + "#define \n".len()).sum();
    let mut output = String::with_capacity(source.len() + defines_len + 1);
    output.push_str(&source[..directive]);
    output.push_str(version_line);
    output.push('\n');
    for define in defines {
        output.push_str("#define ");
        output.push_str(define);
        output.push('\n');
    }
    output.push_str(&source[rest_start..]);
    output
}

/// Byte offset of the `#version` directive
///
/// Only a line whose first non-blank text is `#version` counts, and only when
/// that line does not start inside a `/* */` block comment. Mentions of the
/// directive in `//` comments or later in a line are ignored.
fn find_version_directive(source: &str) -> Option<usize> {
    let mut in_block_comment = false;
    let mut line_start = 0;

    for line in source.split_inclusive('\n') {
        if !in_block_comment {
            let trimmed = line.trim_start_matches([' ', '\t']);
            if trimmed.starts_with(VERSION_DIRECTIVE) {
                return Some(line_start + line.len() - trimmed.len());
            }
        }
        in_block_comment = ends_in_block_comment(line, in_block_comment);
        line_start += line.len();
    }
    None
}

/// Block comment state at the end of `line`, given the state at its start
fn ends_in_block_comment(line: &str, mut in_block_comment: bool) -> bool {
    let mut rest = line;
    loop {
        if in_block_comment {
            match rest.find("*/") {
                Some(end) => {
                    in_block_comment = false;
                    rest = &rest[end + 2..];
                }
                None => return true,
            }
        } else {
            let line_comment = rest.find("//");
            let block_comment = rest.find("/*");
            match (line_comment, block_comment) {
                (_, None) => return false,
                (Some(line_at), Some(block_at)) if line_at < block_at => return false,
                (_, Some(block_at)) => {
                    in_block_comment = true;
                    rest = &rest[block_at + 2..];
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "preprocess_tests.rs"]
mod tests;
