use camino::Utf8PathBuf;
use clap::Parser;
use clap::Subcommand;

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Replay the linear run of commits from `--from` to `--head` onto `--onto`, and print the new
    /// tip. No ref is updated.
    Replay {
        /// Commit to build on.
        #[clap(long, value_name = "rev")]
        onto: String,

        /// Oldest commit to replay.
        #[clap(long, value_name = "rev")]
        from: String,

        /// Newest commit to replay.
        #[clap(long, value_name = "rev", default_value = "HEAD")]
        head: String,

        /// Sign the replayed commits, whatever `commit.gpgSign` says.
        #[clap(short = 'S', long)]
        sign: bool,
    },

    /// Clean up a commit message read from stdin and write it to stdout.
    Cleanup {
        /// One of none, space, all, or git's verbatim, whitespace, strip, default.
        #[clap(long, env = "RECHAIN_CLEANUP")]
        mode: Option<String>,

        #[clap(long, env = "RECHAIN_COMMENT_CHAR")]
        comment_char: Option<String>,
    },

    /// Print the id `file` has as a blob.
    HashObject {
        /// Also write the blob to the object database.
        #[clap(short, long)]
        write: bool,

        #[clap(value_name = "file")]
        file: Utf8PathBuf,
    },
}

#[derive(Debug, Parser)]
pub struct Opt {
    #[clap(subcommand)]
    pub command: Command,

    /// The git directory to work in.
    #[clap(long, env = "RECHAIN_GIT_DIR", default_value = ".git")]
    pub git_dir: Utf8PathBuf,
}
