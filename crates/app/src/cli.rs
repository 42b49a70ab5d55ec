//! Command line arguments backing the `img2txt` binary.
use clap::Parser;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: img2txt <image_path> [target_language]

Examples:
  img2txt image.png           # Extract text only
  img2txt image.png es        # Extract and translate to Spanish
  img2txt image.png fr        # Extract and translate to French
  img2txt image.png hi        # Extract and translate to Hindi

Common language codes: es (Spanish), fr (French), de (German),
  hi (Hindi), zh-CN (Chinese), ja (Japanese), ar (Arabic)";

#[derive(Parser, Debug)]
#[command(
    name = "img2txt",
    about = "Extract text from an image with OCR and optionally translate it",
    version
)]
pub struct Args {
    /// Image to read (jpg, png, …)
    pub image: Option<PathBuf>,

    /// Language code to translate the extracted text into
    pub target_language: Option<String>,

    /// Minimum OCR confidence (0.0-1.0); overrides the config file
    #[arg(long, short = 't')]
    pub threshold: Option<f32>,

    /// Binarize the image (grayscale + adaptive threshold) before OCR
    #[arg(long)]
    pub preprocess: bool,

    /// Collapse whitespace and correct known misreads before printing and translating
    #[arg(long)]
    pub clean: bool,

    /// Language the OCR engine should recognise; repeat for several
    #[arg(long = "ocr-lang", value_name = "CODE")]
    pub ocr_languages: Vec<String>,

    /// TOML config file
    #[arg(long, short = 'c', env = "IMG2TXT_CONFIG")]
    pub config: Option<PathBuf>,
}
