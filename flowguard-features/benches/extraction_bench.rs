#[macro_use]
extern crate criterion;

use std::net::IpAddr;

use criterion::{black_box, Criterion};

use flowguard_capture::Packet;
use flowguard_core::features::keys;
use flowguard_features::FeatureExtractor;

const DEVICE: &str = "10.0.0.7";
const PEER: &str = "93.184.216.34";

fn window(len: usize) -> Vec<Packet> {
    let device: IpAddr = DEVICE.parse().unwrap();
    let peer: IpAddr = PEER.parse().unwrap();
    (0..len)
        .map(|i| {
            let (src, dst) = if i % 2 == 0 { (device, peer) } else { (peer, device) };
            Packet::new(i as f64 * 0.001, 64 + (i % 1400))
                .with_ip(src, dst)
                .with_tcp(40000, 443)
        })
        .collect()
}

fn benchmark_extraction(c: &mut Criterion) {
    let extractor = FeatureExtractor::new(DEVICE.parse().unwrap());
    let schema: Vec<String> = [
        keys::FLOW_DURATION,
        keys::TOTAL_FWD_PACKETS,
        keys::TOTAL_LENGTH_FWD_PACKETS,
        keys::FLOW_BYTES_PER_SEC,
        keys::FLOW_PACKETS_PER_SEC,
        keys::FLOW_IAT_MEAN,
        keys::FLOW_IAT_STD,
        keys::PACKET_LENGTH_VARIANCE,
        keys::AVERAGE_PACKET_SIZE,
        keys::UNIQUE_DST_IPS,
        keys::UNIQUE_DST_PORTS,
    ]
    .iter()
    .map(|k| k.to_string())
    .collect();

    for size in [100, 10_000] {
        let packets = window(size);
        c.bench_function(&format!("extract_{size}_packets"), |b| {
            b.iter(|| black_box(extractor.extract(black_box(&packets), &schema)))
        });
    }
}

criterion_group!(benches, benchmark_extraction);
criterion_main!(benches);
