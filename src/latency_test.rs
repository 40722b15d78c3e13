//! Performance testing suite for the order book.
//!
//! Measures latency and throughput under various scenarios:
//! - Order submission, cancellation and crossing-order matching, per call
//! - Market data access in a tight loop
//! - Sustained throughput with a mixed workload
//!
//! Per-call latencies are summarized as mean/min/p50/p95/p99/max.

use orderbook::{MonotonicClock, OrderBook, OrderId, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// Knobs for one lab run, filled from the command line.
#[derive(Clone, Debug)]
pub struct LabConfig {
    pub seed: u64,
    pub iterations: usize,
    pub throughput_secs: u64,
}

/// Summary of per-call latencies for one operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LatencyStats {
    pub operation: String,
    pub operations: usize,
    pub mean_ns: f64,
    pub min_ns: u64,
    pub p50_ns: u64,
    pub p95_ns: u64,
    pub p99_ns: u64,
    pub max_ns: u64,
    pub throughput_ops: f64,
}

impl LatencyStats {
    /// Sorts `samples` in place and summarizes them. None when empty.
    pub fn from_samples(operation: &str, samples: &mut [u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let n = samples.len();
        let sum: u64 = samples.iter().sum();
        let pct = |p: f64| samples[((n as f64 * p) as usize).min(n - 1)];

        Some(Self {
            operation: operation.to_string(),
            operations: n,
            mean_ns: sum as f64 / n as f64,
            min_ns: samples[0],
            p50_ns: samples[n / 2],
            p95_ns: pct(0.95),
            p99_ns: pct(0.99),
            max_ns: samples[n - 1],
            throughput_ops: if sum == 0 { f64::INFINITY } else { n as f64 * 1e9 / sum as f64 },
        })
    }
}

impl fmt::Display for LatencyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Statistics:", self.operation)?;
        writeln!(f, "  Operations: {}", self.operations)?;
        writeln!(f, "  Mean:   {:.2} ns", self.mean_ns)?;
        writeln!(f, "  Min:    {} ns", self.min_ns)?;
        writeln!(f, "  P50:    {} ns", self.p50_ns)?;
        writeln!(f, "  P95:    {} ns", self.p95_ns)?;
        writeln!(f, "  P99:    {} ns", self.p99_ns)?;
        writeln!(f, "  Max:    {} ns", self.max_ns)?;
        write!(f, "  Throughput: {:.0} ops/sec", self.throughput_ops)
    }
}

/// Tight-loop query timing, where per-call timers would dominate.
#[derive(Clone, Debug, Serialize)]
pub struct QueryReport {
    pub iterations: usize,
    pub total_ns: u128,
    pub mean_ns: f64,
    pub queries_per_sec: f64,
}

impl fmt::Display for QueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Market Data Query Statistics:")?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Total time: {:.2} us", self.total_ns as f64 / 1000.0)?;
        writeln!(f, "  Average latency: {:.2} ns", self.mean_ns)?;
        write!(f, "  Throughput: {:.0} queries/second", self.queries_per_sec)
    }
}

/// Mixed workload run for a fixed wall-clock duration.
#[derive(Clone, Debug, Serialize)]
pub struct SustainedReport {
    pub duration_secs: f64,
    pub orders_processed: u64,
    pub trades_executed: u64,
    pub orders_per_sec: f64,
    pub trades_per_sec: f64,
    pub best_bid: u32,
    pub best_ask: u32,
}

impl fmt::Display for SustainedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sustained Throughput:")?;
        writeln!(f, "  Duration: {:.1} seconds", self.duration_secs)?;
        writeln!(f, "  Orders processed: {}", self.orders_processed)?;
        writeln!(f, "  Trades executed: {}", self.trades_executed)?;
        writeln!(f, "  Order throughput: {:.0} orders/second", self.orders_per_sec)?;
        writeln!(f, "  Trade throughput: {:.0} trades/second", self.trades_per_sec)?;
        write!(f, "  Final book state: bid={}, ask={}", self.best_bid, self.best_ask)
    }
}

/// Everything one lab run measured.
#[derive(Clone, Debug, Serialize)]
pub struct LabReport {
    pub latencies: Vec<LatencyStats>,
    pub market_data: QueryReport,
    pub total_trades: usize,
    pub sustained: Option<SustainedReport>,
}

/// Random order flow in the band 9900..=10100, 1..=1000 lots.
struct OrderFlow {
    rng: StdRng,
}

impl OrderFlow {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn draw(&mut self) -> (u32, u32, Side) {
        let px = self.rng.gen_range(9900..=10100);
        let qty = self.rng.gen_range(1..=1000);
        let side = if self.rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        (px, qty, side)
    }
}

fn time_ns<T>(f: impl FnOnce() -> T) -> (T, u64) {
    let start = Instant::now();
    let out = f();
    let elapsed = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
    (out, elapsed)
}

/// Per-call latency of random submissions into one growing book.
fn bench_order_addition(cfg: &LabConfig, clock: &mut MonotonicClock) -> Option<LatencyStats> {
    let mut flow = OrderFlow::new(cfg.seed);
    let mut ob = OrderBook::new();
    let mut samples = Vec::with_capacity(cfg.iterations);

    for _ in 0..cfg.iterations {
        let (px, qty, side) = flow.draw();
        let ts = clock.now_ns();
        let (_, ns) = time_ns(|| ob.add_order(px, qty, side, ts));
        samples.push(ns);
    }
    info!(resting = ob.len(), trades = ob.trades().len(), "order addition done");
    LatencyStats::from_samples("Order Addition", &mut samples)
}

/// Per-call latency of cancelling every submitted id, filled or not.
fn bench_order_cancellation(cfg: &LabConfig, clock: &mut MonotonicClock) -> Option<LatencyStats> {
    let mut flow = OrderFlow::new(cfg.seed.wrapping_add(1));
    let mut ob = OrderBook::new();
    let count = (cfg.iterations / 10).max(1);

    let ids: Vec<OrderId> = (0..count)
        .map(|_| {
            let (px, qty, side) = flow.draw();
            ob.add_order(px, qty, side, clock.now_ns())
        })
        .collect();

    let mut samples = Vec::with_capacity(count);
    let mut cancelled = 0usize;
    for id in ids {
        let (ok, ns) = time_ns(|| ob.cancel_order(id));
        cancelled += usize::from(ok);
        samples.push(ns);
    }
    info!(cancelled, "order cancellation done");
    LatencyStats::from_samples("Order Cancellation", &mut samples)
}

/// Crossing orders against a book seeded with 1000 levels per side.
/// Returns the stats and the number of trades the run produced.
fn bench_order_matching(cfg: &LabConfig, clock: &mut MonotonicClock) -> (Option<LatencyStats>, usize) {
    let mut ob = OrderBook::new();
    for i in 0..1000u32 {
        ob.add_order(10000 - i, 100, Side::Buy, clock.now_ns());
        ob.add_order(10100 + i, 100, Side::Sell, clock.now_ns());
    }

    let count = (cfg.iterations / 10).max(1);
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let (side, px) = if i % 2 == 0 {
            (Side::Buy, 10200)
        } else {
            (Side::Sell, 9900)
        };
        let ts = clock.now_ns();
        let (_, ns) = time_ns(|| ob.add_order(px, 50, side, ts));
        samples.push(ns);
    }
    (
        LatencyStats::from_samples("Order Matching", &mut samples),
        ob.trades().len(),
    )
}

/// Best bid, best ask and spread read back to back in a loop.
fn bench_market_data(cfg: &LabConfig, clock: &mut MonotonicClock) -> QueryReport {
    let mut flow = OrderFlow::new(cfg.seed.wrapping_add(2));
    let mut ob = OrderBook::new();
    for _ in 0..5000 {
        let (px, qty, side) = flow.draw();
        ob.add_order(px, qty, side, clock.now_ns());
    }

    let iterations = cfg.iterations * 10;
    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(ob.best_bid());
        std::hint::black_box(ob.best_ask());
        std::hint::black_box(ob.spread());
    }
    let total_ns = start.elapsed().as_nanos().max(1);

    QueryReport {
        iterations,
        total_ns,
        mean_ns: total_ns as f64 / iterations.max(1) as f64,
        queries_per_sec: iterations as f64 * 1e9 / total_ns as f64,
    }
}

/// Runs sustained throughput test with mixed workload.
///
/// Mix of order types: 25% each of non-crossing bids/asks, crossing bids/asks.
pub fn run_throughput_test(duration: Duration, clock: &mut MonotonicClock) -> SustainedReport {
    let mut ob = OrderBook::new();
    let mut n = 0u64;
    let mut trades_executed = 0u64;

    let start_time = Instant::now();
    while start_time.elapsed() < duration {
        let offset = (n % 100) as u32;
        let before = ob.trades().len();
        let ts = clock.now_ns();
        match n % 4 {
            0 => ob.add_order(9999 - offset, 100, Side::Buy, ts),
            1 => ob.add_order(10001 + offset, 100, Side::Sell, ts),
            2 => ob.add_order(10001, 50, Side::Buy, ts),
            _ => ob.add_order(9999, 50, Side::Sell, ts),
        };
        trades_executed += (ob.trades().len() - before) as u64;
        n += 1;

        // Periodic market data queries (every 100 orders)
        if n % 100 == 0 {
            std::hint::black_box(ob.best_bid());
            std::hint::black_box(ob.best_ask());
        }
    }

    let elapsed = start_time.elapsed().as_secs_f64().max(f64::EPSILON);
    SustainedReport {
        duration_secs: elapsed,
        orders_processed: n,
        trades_executed,
        orders_per_sec: n as f64 / elapsed,
        trades_per_sec: trades_executed as f64 / elapsed,
        best_bid: ob.best_bid(),
        best_ask: ob.best_ask(),
    }
}

/// Runs complete latency suite; the sustained test is skipped at 0 seconds.
pub fn run_lab(cfg: &LabConfig) -> LabReport {
    let mut clock = MonotonicClock::new();
    let mut latencies = Vec::new();

    latencies.extend(bench_order_addition(cfg, &mut clock));
    latencies.extend(bench_order_cancellation(cfg, &mut clock));
    let (matching, total_trades) = bench_order_matching(cfg, &mut clock);
    latencies.extend(matching);
    let market_data = bench_market_data(cfg, &mut clock);

    let sustained = (cfg.throughput_secs > 0)
        .then(|| run_throughput_test(Duration::from_secs(cfg.throughput_secs), &mut clock));

    LabReport {
        latencies,
        market_data,
        total_trades,
        sustained,
    }
}

impl fmt::Display for LabReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stats in &self.latencies {
            writeln!(f, "{stats}")?;
            writeln!(f)?;
        }
        writeln!(f, "Total trades executed by matching run: {}", self.total_trades)?;
        writeln!(f)?;
        write!(f, "{}", self.market_data)?;
        if let Some(sustained) = &self.sustained {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "{sustained}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_from_known_samples() {
        let mut samples: Vec<u64> = (1..=100).rev().collect();
        let stats = LatencyStats::from_samples("Op", &mut samples).expect("non-empty");

        assert_eq!(stats.operations, 100);
        assert_eq!(stats.min_ns, 1);
        assert_eq!(stats.max_ns, 100);
        assert_eq!(stats.p50_ns, 51);
        assert_eq!(stats.p95_ns, 96);
        assert_eq!(stats.p99_ns, 100);
        assert!((stats.mean_ns - 50.5).abs() < 1e-9);
    }

    #[test]
    fn stats_empty_is_none() {
        assert!(LatencyStats::from_samples("Op", &mut []).is_none());
    }

    #[test]
    fn stats_single_sample() {
        let stats = LatencyStats::from_samples("Op", &mut [7]).expect("one sample");
        assert_eq!((stats.min_ns, stats.p50_ns, stats.p99_ns, stats.max_ns), (7, 7, 7, 7));
    }

    #[test]
    fn order_flow_is_seeded() {
        let mut a = OrderFlow::new(42);
        let mut b = OrderFlow::new(42);
        for _ in 0..100 {
            let (px, qty, side) = a.draw();
            assert_eq!((px, qty, side), b.draw());
            assert!((9900..=10100).contains(&px));
            assert!((1..=1000).contains(&qty));
        }
    }

    #[test]
    fn small_lab_run_reports_every_operation() {
        let cfg = LabConfig {
            seed: 7,
            iterations: 200,
            throughput_secs: 0,
        };
        let report = run_lab(&cfg);

        let ops: Vec<&str> = report.latencies.iter().map(|s| s.operation.as_str()).collect();
        assert_eq!(ops, vec!["Order Addition", "Order Cancellation", "Order Matching"]);
        assert!(report.total_trades > 0);
        assert_eq!(report.market_data.iterations, 2000);
        assert!(report.sustained.is_none());
    }
}
