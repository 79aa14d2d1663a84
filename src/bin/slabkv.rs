//! SlabKV demo binary
//!
//! Drives a store through its public operations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use slabkv::{Config, Handle, SlabError, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// SlabKV
#[derive(Parser, Debug)]
#[command(name = "slabkv")]
#[command(about = "Embedded key-value engine over memory-mapped segments")]
#[command(version)]
struct Args {
    /// Data directory (recreated on every run)
    #[arg(short, long, default_value = "/tmp/kvtest")]
    data_dir: PathBuf,

    /// Physically zero-fill segment files
    #[arg(short, long)]
    preallocate: bool,

    /// Segment size in KB
    #[arg(short, long, default_value = "65536")]
    segment_kb: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert, read back and delete a few records
    Demo,

    /// Insert synthetic records and report store statistics
    Fill {
        /// Number of records to insert
        #[arg(short, long, default_value = "1000")]
        count: usize,

        /// Value size in bytes
        #[arg(short, long, default_value = "100")]
        value_size: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slabkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("SlabKV v{}", slabkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir.display());

    let result = Config::segment_size_from_kb(args.segment_kb)
        .map(|segment_size| {
            Config::builder()
                .data_dir(&args.data_dir)
                .preallocate(args.preallocate)
                .segment_size(segment_size)
                .build()
        })
        .and_then(Store::open)
        .and_then(|store| {
            match args.command {
                Commands::Demo => run_demo(&store)?,
                Commands::Fill { count, value_size } => run_fill(&store, count, value_size)?,
            }
            store.close()
        });

    if let Err(e) = result {
        tracing::error!("Store error: {}", e);
        std::process::exit(1);
    }
}

/// Insert two records, read one back, delete the other and reuse its slot
fn run_demo(store: &Store) -> slabkv::Result<()> {
    let h1 = store.insert(b"k1", b"hello")?;
    let h2 = store.insert(b"k2", b"world")?;
    tracing::info!("inserted k1 at {}, k2 at {}", h1, h2);

    print_record(store, h1)?;

    store.delete(h2)?;
    match store.get(h2) {
        Err(SlabError::NotFound(h)) => tracing::info!("record {} is gone", h),
        other => tracing::warn!("unexpected result after delete: {:?}", other),
    }

    let h3 = store.insert(b"k3", b"!")?;
    tracing::info!(
        "inserted k3 at {} (reused k2's slot: {})",
        h3,
        h3 == h2
    );
    print_record(store, h3)?;

    Ok(())
}

/// Insert `count` records of `value_size` bytes
fn run_fill(store: &Store, count: usize, value_size: usize) -> slabkv::Result<()> {
    let value = vec![b'x'; value_size];
    let mut last = None;

    for i in 0..count {
        let key = format!("key_{:08}", i);
        last = Some(store.insert(key.as_bytes(), &value)?);
    }

    if let Some(handle) = last {
        print_record(store, handle)?;
    }

    let stats = store.stats();
    tracing::info!(
        "inserted {} records: {} segments, cursor at segment {} offset {}",
        count,
        stats.segment_count,
        stats.end_segment,
        stats.end_position
    );

    Ok(())
}

fn print_record(store: &Store, handle: Handle) -> slabkv::Result<()> {
    let (key, value) = store.get(handle)?;
    tracing::info!(
        "record {}: key={} value={} ({} bytes)",
        handle,
        String::from_utf8_lossy(&key),
        String::from_utf8_lossy(&value),
        value.len()
    );
    Ok(())
}
