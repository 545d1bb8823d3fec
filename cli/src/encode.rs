use clap::Args;
use eyre::{Result, WrapErr};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::io::{sources, Encoding, Input, Output};

#[derive(Args, Debug)]
pub struct Opts {
    /// Output encoding
    #[clap(long, value_enum, default_value_t = Encoding::Json)]
    pub to: Encoding,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input files [default: stdin]
    pub files: Vec<String>,
}

pub async fn encode(opts: &Opts) -> Result<()> {
    let mut output = Output::from_filename(&opts.output).await?;
    let to = decimator::Format::from(opts.to);

    for source in sources(&opts.files) {
        let mut input = Input::from_filename(&source).await?;
        let Some(from) = input.detect_format().await? else {
            continue;
        };

        let mut count = 0usize;
        while let Some(point) = from
            .decode(&mut input)
            .await
            .wrap_err_with(|| format!("decoding {}", source))?
        {
            to.encode(&mut output, &point).await?;
            count += 1;
        }
        debug!(source = %source, %from, %to, points = count, "transcoded");
    }

    output.flush().await?;
    Ok(())
}
