use clap::{Args, ValueEnum};
use decimator::{Point, RingBuffer};
use eyre::{Result, WrapErr};
use tracing::debug;

use crate::io::{sources, write_points, Encoding, Input};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Order {
    OldestFirst,
    NewestFirst,
}

#[derive(Args, Debug)]
pub struct Opts {
    /// Number of most recent points to keep
    #[clap(long, short = 'c', default_value_t = 100)]
    pub capacity: usize,

    /// Output order
    #[clap(long, value_enum, default_value_t = Order::OldestFirst)]
    pub order: Order,

    /// Output encoding
    #[clap(long, value_enum, default_value_t = Encoding::Json)]
    pub to: Encoding,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input files [default: stdin]
    pub files: Vec<String>,
}

pub async fn tail(opts: &Opts) -> Result<()> {
    let mut history = RingBuffer::new(opts.capacity);
    let mut read = 0usize;

    for source in sources(&opts.files) {
        let mut input = Input::from_filename(&source).await?;
        let Some(format) = input.detect_format().await? else {
            continue;
        };
        while let Some(point) = format
            .decode(&mut input)
            .await
            .wrap_err_with(|| format!("decoding {}", source))?
        {
            history.add(point);
            read += 1;
        }
    }
    debug!(read, kept = history.len(), capacity = opts.capacity, "tail");

    write_points(&opts.output, opts.to.into(), &ordered(&history, opts.order)).await
}

fn ordered(history: &RingBuffer<Point>, order: Order) -> Vec<Point> {
    match order {
        Order::OldestFirst => history.iter_oldest_to_newest().copied().collect(),
        Order::NewestFirst => history.iter_newest_to_oldest().copied().collect(),
    }
}
