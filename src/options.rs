use structopt::StructOpt;

#[derive(StructOpt)]
pub struct Options {
    /// Path of the config file
    #[structopt(default_value = "graphmock.toml")]
    pub config: String,

    /// Print the response on a single line
    #[structopt(long)]
    pub compact: bool,
}
