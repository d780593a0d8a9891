//! On-disk layout of provisioned tools and the archive routing rules.

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use vidup_core::Tool;

/// Real-ESRGAN engine binary name, without platform suffix.
const ESRGAN_BINARY: &str = "realesrgan-ncnn-vulkan";

/// Directory under the install root that holds a tool.
pub fn tool_dir(root: &Path, tool: Tool) -> PathBuf {
    match tool {
        Tool::Ffmpeg => root.join("ffmpeg"),
        Tool::RealEsrgan => root.join("realesrgan-engine"),
    }
}

/// Executable file name for the current platform.
pub fn executable_name(tool: Tool) -> String {
    match tool {
        Tool::Ffmpeg => format!("ffmpeg{}", EXE_SUFFIX),
        Tool::RealEsrgan => format!("{}{}", ESRGAN_BINARY, EXE_SUFFIX),
    }
}

/// Full path of a tool's executable under `root`.
pub fn executable_path(root: &Path, tool: Tool) -> PathBuf {
    tool_dir(root, tool).join(executable_name(tool))
}

/// How an archive member is recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberPattern {
    /// Exact file name, case-insensitive.
    FileName(String),
    /// File extension without the dot, case-insensitive.
    Extension(&'static str),
    /// File extension, only for members inside a directory with the given name.
    ExtensionUnder {
        dir: &'static str,
        extension: &'static str,
    },
}

impl MemberPattern {
    fn matches(&self, member: &Path) -> bool {
        let file_name = match member.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        let extension = member.extension().and_then(|e| e.to_str());

        match self {
            MemberPattern::FileName(name) => file_name.eq_ignore_ascii_case(name),
            MemberPattern::Extension(ext) => extension.is_some_and(|e| e.eq_ignore_ascii_case(ext)),
            MemberPattern::ExtensionUnder { dir, extension: ext } => {
                let in_dir = member
                    .parent()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(dir));
                in_dir && extension.is_some_and(|e| e.eq_ignore_ascii_case(ext))
            }
        }
    }
}

/// Routes matching archive members into a directory relative to the install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRule {
    pub pattern: MemberPattern,
    pub dest: PathBuf,
}

impl ExtractRule {
    fn new(pattern: MemberPattern, dest: impl Into<PathBuf>) -> Self {
        Self {
            pattern,
            dest: dest.into(),
        }
    }

    /// Destination of `member` relative to the install root, if this rule takes it.
    ///
    /// Members are flattened: only the file name is kept.
    pub fn route(&self, member: &Path) -> Option<PathBuf> {
        if !self.pattern.matches(member) {
            return None;
        }
        member.file_name().map(|name| self.dest.join(name))
    }
}

/// Extraction rules for a tool's release archive.
///
/// Rules are tried in order; the first match wins.
pub fn extract_rules(tool: Tool) -> Vec<ExtractRule> {
    match tool {
        Tool::Ffmpeg => vec![
            ExtractRule::new(MemberPattern::FileName(executable_name(Tool::Ffmpeg)), "ffmpeg"),
            ExtractRule::new(
                MemberPattern::FileName(format!("ffprobe{}", EXE_SUFFIX)),
                "ffmpeg",
            ),
        ],
        Tool::RealEsrgan => {
            let engine = PathBuf::from("realesrgan-engine");
            vec![
                ExtractRule::new(
                    MemberPattern::ExtensionUnder {
                        dir: "models",
                        extension: "bin",
                    },
                    engine.join("models"),
                ),
                ExtractRule::new(
                    MemberPattern::ExtensionUnder {
                        dir: "models",
                        extension: "param",
                    },
                    engine.join("models"),
                ),
                ExtractRule::new(MemberPattern::FileName(executable_name(Tool::RealEsrgan)), &engine),
                ExtractRule::new(MemberPattern::Extension("exe"), &engine),
                ExtractRule::new(MemberPattern::Extension("dll"), &engine),
            ]
        }
    }
}

/// Find where the first matching rule sends `member`.
pub(crate) fn route_member(rules: &[ExtractRule], member: &Path) -> Option<PathBuf> {
    rules.iter().find_map(|rule| rule.route(member))
}
