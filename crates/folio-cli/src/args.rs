use std::path::PathBuf;

#[derive(Debug, Clone, clap::Parser)]
#[clap(name = "folio", author, version, about)]
pub struct CliArguments {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Commands {
    /// Rewrites a stored page in canonical form
    Fmt(FmtArgs),
    /// Prints the render plan of a page as JSON
    Plan(PlanArgs),
    /// Prints the content hash and asset path of media files
    Hash(HashArgs),
}

#[derive(Debug, Clone, clap::Parser)]
pub struct FmtArgs {
    /// Site root directory
    pub root: PathBuf,
    /// Page path relative to the root, ending in `index.html`
    pub page: PathBuf,
    /// Report pages that are not canonical instead of rewriting them
    #[clap(long)]
    pub check: bool,
    /// Prefix from the page to the site root used in the page envelope.
    /// Derived from the page depth when omitted
    #[clap(long)]
    pub script_root: Option<String>,
}

#[derive(Debug, Clone, clap::Parser)]
pub struct PlanArgs {
    /// Page or fragment to lay out
    pub file: PathBuf,
    /// JSON file with layout options
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Viewport width in CSS pixels
    #[clap(long)]
    pub viewport: Option<f64>,
}

#[derive(Debug, Clone, clap::Parser)]
pub struct HashArgs {
    /// Media files to hash
    #[clap(required = true)]
    pub files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_fmt() {
        let args = CliArguments::try_parse_from(["folio", "fmt", "site", "blog/index.html", "--check"]).unwrap();
        match args.command {
            Commands::Fmt(fmt) => {
                assert_eq!(fmt.page, PathBuf::from("blog/index.html"));
                assert!(fmt.check);
                assert_eq!(fmt.script_root, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_plan() {
        let args = CliArguments::try_parse_from(["folio", "plan", "index.html", "--viewport", "390"]).unwrap();
        match args.command {
            Commands::Plan(plan) => assert_eq!(plan.viewport, Some(390.0)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_hash_requires_files() {
        assert!(CliArguments::try_parse_from(["folio", "hash"]).is_err());
    }
}
