use crate::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "img";

fn sanitize(value: &str, keep: impl Fn(char) -> bool) -> String {
    value
        .chars()
        .map(|c| if keep(c) { c } else { '_' })
        .collect()
}

/// `<username>_<site>_badges.svg`, with separators in the site flattened to `_`.
pub fn output_file_name(username: &str, site: &str) -> String {
    let username = sanitize(username, |c| c.is_alphanumeric() || c == '-' || c == '_');
    let site = sanitize(site, char::is_alphanumeric);
    format!("{}_{}_badges.svg", username, site)
}

/// Write the SVG into `dir`, creating it if needed and replacing any previous file.
pub fn save_svg(dir: &Path, file_name: &str, svg: &str) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, svg)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name("alice", "leetcode.com"),
            "alice_leetcode_com_badges.svg"
        );
        assert_eq!(
            output_file_name("bob-2_x", "leetcode.cn"),
            "bob-2_x_leetcode_cn_badges.svg"
        );
    }

    #[test]
    fn test_path_separators_flattened() {
        assert_eq!(
            output_file_name("../evil", "a/b"),
            "___evil_a_b_badges.svg"
        );
    }

    #[test]
    fn test_save_creates_dir_and_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("img");

        let path = save_svg(&dir, "a.svg", "<svg>first</svg>").unwrap();
        assert_eq!(path, dir.join("a.svg"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<svg>first</svg>");

        save_svg(&dir, "a.svg", "<svg>second</svg>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<svg>second</svg>");
    }
}
