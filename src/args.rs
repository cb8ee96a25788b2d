use std::env;
use std::path::PathBuf;

/// Default frame stride: the game only needs every 5th captured frame
pub const DEFAULT_STRIDE: usize = 5;

#[derive(Debug)]
pub struct Args {
    pub frames_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub stride: usize,
    pub debug_mode: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().collect();
        Self::parse_from(args.iter().skip(1).map(String::as_str))
    }

    pub fn parse_from<'a>(args: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut frames_dir: Option<PathBuf> = None;
        let mut assets_dir: PathBuf = PathBuf::from("assets");
        let mut catalog_path: Option<PathBuf> = None;
        let mut config_path: Option<PathBuf> = None;
        let mut stride: usize = DEFAULT_STRIDE;
        let mut debug_mode: bool = false;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "Captcha Tracker v{} (built {})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if let Some(val) = arg.strip_prefix("--frames=") {
                frames_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--assets=") {
                assets_dir = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--catalog=") {
                catalog_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--stride=") {
                match val.parse::<usize>() {
                    Ok(n) if n > 0 => stride = n,
                    _ => {
                        eprintln!("❌ Invalid stride value: {}", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        let Some(frames_dir) = frames_dir else {
            eprintln!("❌ Missing required --frames=DIR");
            print_help();
            return None;
        };

        Some(Args {
            frames_dir,
            catalog_path: catalog_path.unwrap_or_else(|| assets_dir.join("catalog.txt")),
            assets_dir,
            config_path,
            stride,
            debug_mode,
        })
    }
}

fn print_help() {
    println!("🎯 Captcha Tracker");
    println!();
    println!("USAGE:");
    println!("    captcha-tracker --frames=DIR [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --frames=DIR        Directory of captured frames (PNG/JPEG, replayed in name order)");
    println!("    --assets=DIR        Asset root with templates/ and creatures/ (default: assets)");
    println!("    --catalog=FILE      Creature name list (default: <assets>/catalog.txt)");
    println!("    --config=FILE       JSON session configuration (defaults if omitted)");
    println!("    --stride=N          Process every Nth frame (default: {})", DEFAULT_STRIDE);
    println!("    --debug             Enable debug logging");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("OUTPUT:");
    println!("    One JSON line per click target: {{\"frame\":N,\"x\":X,\"y\":Y}}");
    println!();
    println!("EXAMPLES:");
    println!("    captcha-tracker --frames=capture/");
    println!("    captcha-tracker --frames=capture/ --assets=assets --stride=1 --debug");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = Args::parse_from(["--frames=capture"]).unwrap();
        assert_eq!(args.frames_dir, PathBuf::from("capture"));
        assert_eq!(args.catalog_path, PathBuf::from("assets/catalog.txt"));
        assert_eq!(args.stride, DEFAULT_STRIDE);
        assert!(!args.debug_mode);
        assert!(args.config_path.is_none());
    }

    #[test]
    fn test_parse_all_flags() {
        let args = Args::parse_from([
            "--frames=f",
            "--assets=a",
            "--catalog=names.txt",
            "--config=c.json",
            "--stride=2",
            "--debug",
        ])
        .unwrap();
        assert_eq!(args.assets_dir, PathBuf::from("a"));
        assert_eq!(args.catalog_path, PathBuf::from("names.txt"));
        assert_eq!(args.config_path, Some(PathBuf::from("c.json")));
        assert_eq!(args.stride, 2);
        assert!(args.debug_mode);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Args::parse_from(["--stride=2"]).is_none());
        assert!(Args::parse_from(["--frames=f", "--stride=0"]).is_none());
        assert!(Args::parse_from(["--frames=f", "--bogus"]).is_none());
    }
}
