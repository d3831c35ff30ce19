use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "reelgrab")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Instagram reel URL; omit to run the interactive wizard
    pub url: Option<String>,

    /// Base URL of the reel backend (e.g., https://reels.example.com)
    #[arg(long, env = "REELGRAB_API_BASE")]
    pub api_base: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: String,

    /// Skip the download confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "300")]
    pub timeout: u64,

    /// HTTP proxy (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Keep the thumbnail preview image after a successful download
    #[arg(long)]
    pub keep_thumbnail: bool,
}
