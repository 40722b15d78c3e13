//! Matchbook Performance Lab
//!
//! Runs a walkthrough of the order book (resting, crossing, cancelling,
//! sweeping) followed by the latency and throughput suite.

use clap::Parser;
use orderbook::{MonotonicClock, OrderBook, OrderId, Side};

mod latency_test;

use latency_test::LabConfig;

#[derive(Parser, Debug)]
#[command(name = "matchbook")]
#[command(about = "Order book demo and latency lab")]
struct Args {
    /// Seed for the random order flow
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Per-call samples for order addition (other runs scale from this)
    #[arg(short, long, default_value_t = 100_000)]
    iterations: usize,
    /// Length of the sustained mixed-workload run; 0 skips it
    #[arg(long, default_value_t = 10)]
    throughput_secs: u64,
    #[arg(long)]
    skip_demo: bool,
    #[arg(long)]
    skip_latency: bool,
    /// Print the lab report as JSON instead of text
    #[arg(long)]
    json: bool,
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

/// Main entry point - runs demo and performance tests.
fn main() -> Result<(), serde_json::Error> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    if !args.skip_demo {
        run_basic_demo();
    }

    if !args.skip_latency {
        let cfg = LabConfig {
            seed: args.seed,
            iterations: args.iterations,
            throughput_secs: args.throughput_secs,
        };
        tracing::info!(?cfg, "starting latency lab");
        let report = latency_test::run_lab(&cfg);

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("\n=== Performance Lab ===\n");
            println!("{report}");
        }
    }

    Ok(())
}

/// Demonstrates resting, crossing, cancelling and sweeping on one book.
fn run_basic_demo() {
    let mut clock = MonotonicClock::new();
    let mut ob = OrderBook::new();

    println!("=== Order Book Demo ===\n");
    println!("1. Adding initial orders...");

    ob.add_order(10050, 100, Side::Buy, clock.now_ns());
    ob.add_order(10048, 200, Side::Buy, clock.now_ns());
    ob.add_order(10045, 150, Side::Buy, clock.now_ns());

    ob.add_order(10055, 120, Side::Sell, clock.now_ns());
    ob.add_order(10058, 180, Side::Sell, clock.now_ns());
    ob.add_order(10060, 100, Side::Sell, clock.now_ns());

    println!("{}\n", ob.display(5));

    println!("2. Adding a buy order that crosses the spread...");
    // Takes all 120 @ 10055, rests 30 @ 10056 (10058 is above its limit)
    ob.add_order(10056, 150, Side::Buy, clock.now_ns());
    println!("{}\n", ob.display(5));

    println!("Trades executed:");
    for trade in ob.trades() {
        println!(
            "  Buy Order {} x Sell Order {} | Price: {} | Qty: {}",
            trade.buy_order(),
            trade.sell_order(),
            trade.px_ticks(),
            trade.qty()
        );
    }

    println!("\n3. Cancelling an order...");
    if ob.cancel_order(OrderId(5)) {
        println!("  Order #5 cancelled successfully");
    }
    println!("{}\n", ob.display(5));

    println!("4. Adding aggressive sell order...");
    ob.add_order(10047, 250, Side::Sell, clock.now_ns());
    println!("{}\n", ob.display(5));

    println!("=== Statistics ===");
    println!("Best Bid: {}", ob.best_bid());
    println!("Best Ask: {}", ob.best_ask());
    println!("Spread: {} ticks", ob.spread());
    println!("Bid Depth: {} levels", ob.bid_depth());
    println!("Ask Depth: {} levels", ob.ask_depth());
    println!("Total Trades: {}", ob.trades().len());
}
