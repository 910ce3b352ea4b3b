use std::path::PathBuf;

use clipdeck_core::ItemSource;

use super::error::AppError;

pub const USAGE: &str = "usage: clipdeck_app [--config <file.ron>] <video file or URL>...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub sources: Vec<ItemSource>,
}

impl CliOptions {
    pub fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config_path = None;
        let mut sources = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args
                        .next()
                        .ok_or_else(|| usage("--config needs a path"))?;
                    config_path = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') => {
                    return Err(usage(&format!("unknown option {flag}")));
                }
                _ => sources.push(classify(arg)),
            }
        }

        if sources.is_empty() {
            return Err(usage("no videos given"));
        }
        Ok(Self {
            config_path,
            sources,
        })
    }
}

fn usage(problem: &str) -> AppError {
    AppError::Usage(format!("{problem}\n{USAGE}"))
}

/// Anything with an http(s) scheme is a link; the rest are file names.
fn classify(arg: String) -> ItemSource {
    let lower = arg.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        ItemSource::Url { url: arg }
    } else {
        ItemSource::File { name: arg }
    }
}
