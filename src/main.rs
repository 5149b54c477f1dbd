use clap::Parser;
use drive_content_sync::drive::{HttpDrive, auth};
use drive_content_sync::imaging::RustBackend;
use drive_content_sync::{config, output, sync};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "drive-content-sync")]
#[command(version)]
#[command(about = "Sync website content from Google Drive into local JSON and media files")]
#[command(long_about = "\
Sync website content from Google Drive into local JSON and media files

A shared Drive folder is the CMS. Its layout becomes four JSON documents
plus every referenced photo and video, with blurred previews and resized
copies of each photo.

Drive layout:

  <root>/
  ├── contact                      # Sheet: email,<address> / instagram,<handle>
  ├── home/
  │   ├── bio                      # Doc (plain text)
  │   ├── introduction             # Doc
  │   ├── quotes                   # Sheet: quote,name
  │   ├── name_checks              # Sheet: name,url
  │   └── images/                  # Photos shown on the home page
  ├── portfolio/
  │   ├── Landscapes/              # Album (one level only)
  │   └── Portraits/
  └── video/                       # Videos plus their cover images

Output:

  <output-dir>/
  ├── contact.json  home.json  portfolio.json  video.json
  ├── <file_id>.<ext>              # Original media, verified by size + sha256
  └── <file_id>.preview|medium|large.<ext>

Run 'drive-content-sync --print-config' for a documented config file.")]
struct Cli {
    /// Service-account key file
    #[arg(short, long, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Directory for JSON documents and media
    #[arg(short, long, default_value = "./content")]
    output_dir: PathBuf,

    /// TOML file overriding the stock configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a stock config file with all options documented, then exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(cli.config.as_deref())?;
    let credentials = resolve_cli_path(&cli.credentials)?;
    let output_dir = resolve_cli_path(&cli.output_dir)?;

    println!("==> Authenticating with Google Drive");
    println!("    Credentials: {}", credentials.display());
    let token = auth::service_account_token(&credentials)?;
    let drive = HttpDrive::new(token)?;
    let backend = RustBackend::new();

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_sync_event(&event);
        }
    });
    let result = sync::run(&drive, &backend, &config, &output_dir, Some(tx));
    printer
        .join()
        .map_err(|_| "output thread panicked".to_string())?;
    result?;

    println!("==> Content written to {}", output_dir.display());
    Ok(())
}

/// Expand a leading `~` and make the path absolute.
fn resolve_cli_path(path: &Path) -> std::io::Result<PathBuf> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };
    std::path::absolute(expanded)
}
