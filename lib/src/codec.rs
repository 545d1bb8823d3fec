use async_trait::async_trait;
use eyre::Result;
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _};

use crate::point::Point;

// A Codec reads and writes points one record per line. decode returns None
// once the input is exhausted.
#[async_trait]
pub trait Codec {
    async fn encode<W: AsyncWrite + Unpin + Send>(
        &self,
        writer: &mut W,
        point: &Point,
    ) -> Result<()>;
    async fn decode<R: AsyncBufRead + Unpin + Send>(
        &self,
        reader: &mut R,
    ) -> Result<Option<Point>>;
}

pub struct JsonCodec;

#[async_trait]
impl Codec for JsonCodec {
    async fn encode<W: AsyncWrite + Unpin + Send>(
        &self,
        writer: &mut W,
        point: &Point,
    ) -> Result<()> {
        // serde_json writes infinities as null, which would read back as a gap.
        if point.x.is_infinite() || point.y.is_infinite() {
            eyre::bail!("json cannot encode non-finite point ({}, {})", point.x, point.y);
        }
        writer.write_all(&serde_json::to_vec(point)?).await?;
        writer.write_all(b"\n").await?;
        Ok(())
    }

    async fn decode<R: AsyncBufRead + Unpin + Send>(
        &self,
        reader: &mut R,
    ) -> Result<Option<Point>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(None);
            }
            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return serde_json::from_slice(&buf).map(Some).map_err(|e| eyre::eyre!(e));
        }
    }
}

pub struct CsvCodec;

#[async_trait]
impl Codec for CsvCodec {
    async fn encode<W: AsyncWrite + Unpin + Send>(
        &self,
        writer: &mut W,
        point: &Point,
    ) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.serialize(point)?;
        let buf = wtr.into_inner().map_err(|e| eyre::eyre!(e.to_string()))?;
        writer.write_all(&buf).await?;
        Ok(())
    }

    async fn decode<R: AsyncBufRead + Unpin + Send>(
        &self,
        reader: &mut R,
    ) -> Result<Option<Point>> {
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            // Skip blank lines and an optional header.
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("x,y") {
                continue;
            }
            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .from_reader(trimmed.as_bytes());
            return match rdr.deserialize::<Point>().next() {
                Some(record) => Ok(Some(record?)),
                None => eyre::bail!("bad csv record: {}", trimmed),
            };
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    pub async fn encode<W: AsyncWrite + Unpin + Send>(
        self,
        writer: &mut W,
        point: &Point,
    ) -> Result<()> {
        match self {
            Format::Json => JsonCodec.encode(writer, point).await,
            Format::Csv => CsvCodec.encode(writer, point).await,
        }
    }

    pub async fn decode<R: AsyncBufRead + Unpin + Send>(
        self,
        reader: &mut R,
    ) -> Result<Option<Point>> {
        match self {
            Format::Json => JsonCodec.decode(reader).await,
            Format::Csv => CsvCodec.decode(reader).await,
        }
    }
}

impl FromStr for Format {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            _ => eyre::bail!("unknown encoding: {}", s),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Format::Json => f.write_str("json"),
            Format::Csv => f.write_str("csv"),
        }
    }
}

/// Peeks at the first buffered byte to tell JSON from CSV input. Returns None
/// for empty input.
pub async fn detect_format<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<Format>> {
    let buf = reader.fill_buf().await?;
    match buf.iter().copied().find(|b| !b.is_ascii_whitespace()) {
        None if buf.is_empty() => Ok(None),
        Some(b'{') => Ok(Some(Format::Json)),
        _ => Ok(Some(Format::Csv)),
    }
}

/// Decodes every point in `reader`, detecting its format first.
pub async fn decode_all<R: AsyncBufRead + Unpin + Send>(reader: &mut R) -> Result<Vec<Point>> {
    let Some(format) = detect_format(reader).await? else {
        return Ok(Vec::new());
    };
    let mut points = Vec::new();
    while let Some(point) = format.decode(reader).await? {
        points.push(point);
    }
    Ok(points)
}
