use std::time::Duration;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use num_bigint::BigInt;
use staple_engine_core::amm::types::{TokenParams, TokenStatus, VtpParams, VtpStatus, WAD};
use staple_engine_core::{estimate_allocate, estimate_deallocate, DeallocatePosition, SimulationConfig, Token, Vtp};
fn w(n: u64) -> BigInt { BigInt::from(n) * &*WAD }

fn token(assets: u64, liability: u64, lb: u32) -> Token {
Token {
params: TokenParams {
decimals: 18,
swap_fee_in: 0u8.into(),
swap_fee_out: 0u8.into(),
protocol_fee_rate: 0u8.into(),
max_allocate_rate: 0u8.into(),
alr_lower_bound: lb.into(),
},
status: TokenStatus { assets: w(assets), liability: w(liability), total_shares: w(liability) },
}
}


fn bench_liquidity(c: &mut Criterion) {
let mut g = c.benchmark_group("liquidity");
g.warm_up_time(Duration::from_secs(2));
g.measurement_time(Duration::from_secs(5));
g.sample_size(300);
g.throughput(Throughput::Elements(1));

let vtp = Vtp {
params: VtpParams { n: 10u8.into(), p: 1200u32.into() },
status: VtpStatus { po: WAD.clone(), pa: WAD.clone() },
};
let cfg = SimulationConfig::default();
let (under, over) = (token(900_000, 1_000_000, 8_000), token(1_100_000, 1_000_000, 8_000));


g.bench_function("allocate_under", |b| {
b.iter(|| {
let r = estimate_allocate(black_box(&vtp), black_box(&under), black_box(&over), black_box("1000"), &cfg)
.unwrap();
black_box(r);
});
});

g.bench_function("allocate_over", |b| {
b.iter(|| {
let r = estimate_allocate(black_box(&vtp), black_box(&over), black_box(&under), black_box("1000"), &cfg)
.unwrap();
black_box(r);
});
});

let position = DeallocatePosition { user_allocation: "600000", user_shares: "600000", total_shares: "1000000" };
g.bench_function("deallocate_with_pause", |b| {
b.iter(|| {
let r = estimate_deallocate(
black_box(&vtp), black_box(&under), black_box(&over), black_box("600000"), &position, &cfg,
)
.unwrap();
black_box(r);
});
});


g.finish();
}


criterion_group!(benches, bench_liquidity);
criterion_main!(benches);
