//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Benchmarks for status parsing

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ovpnmgmt_status::{Client, StatusSnapshot};

fn status_reply(clients: usize) -> String {
    let mut text = String::from("OpenVPN CLIENT LIST\nUpdated,Tue Feb 10 23:30:53 2015\n");
    text.push_str("Common Name,Real Address,Bytes Received,Bytes Sent,Connected Since\n");
    for i in 0..clients {
        text.push_str(&format!(
            "client{i},10.{}.{}.1:{},19192,19924,Tue Feb 10 23:30:46 2015\n",
            (i / 250) % 250,
            i % 250,
            30000 + (i % 30000)
        ));
    }
    text.push_str("ROUTING TABLE\nVirtual Address,Common Name,Real Address,Last Ref\n");
    for i in 0..clients {
        text.push_str(&format!(
            "10.8.{}.{},client{i},10.{}.{}.1:{},Tue Feb 10 23:30:52 2015\n",
            (i / 250) % 250,
            i % 250,
            (i / 250) % 250,
            i % 250,
            30000 + (i % 30000)
        ));
    }
    text.push_str("GLOBAL STATS\nMax bcast/mcast queue length,0\nEND\n");
    text
}

fn bench_parse_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_status");

    for clients in [1usize, 50, 500].iter() {
        let reply = status_reply(*clients);
        group.throughput(Throughput::Bytes(reply.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(clients), &reply, |b, reply| {
            b.iter(|| black_box(reply.parse::<StatusSnapshot>().unwrap()));
        });
    }

    group.finish();
}

fn bench_parse_client_row(c: &mut Criterion) {
    c.bench_function("parse_client_row", |b| {
        b.iter(|| {
            black_box(
                "cloud.msk.pp.ua,192.168.1.1:59113,19192,19924,Tue Feb 10 23:30:46 2015"
                    .parse::<Client>()
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, bench_parse_status, bench_parse_client_row);
criterion_main!(benches);
