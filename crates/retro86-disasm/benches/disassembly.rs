//! Benchmarks for decode throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use retro86_core::Bitness;
use retro86_disasm::Ia32Disassembler;

/// Sample 32-bit code: a small function with a realistic mix of moves,
/// arithmetic, memory operands, control flow and x87.
const IA32_CODE: &[u8] = &[
    0x55, // push ebp
    0x8b, 0xec, // mov ebp, esp
    0x83, 0xec, 0x20, // sub esp, 0x20
    0x8b, 0x45, 0x08, // mov eax, [ebp+8]
    0x8b, 0x4c, 0x85, 0x10, // mov ecx, [ebp+eax*4+0x10]
    0x03, 0xc8, // add ecx, eax
    0x89, 0x4d, 0xfc, // mov [ebp-4], ecx
    0xd9, 0x45, 0xfc, // fld dword [ebp-4]
    0xd8, 0xc0, // fadd st(0), st(0)
    0xd9, 0x5d, 0xf8, // fstp dword [ebp-8]
    0x83, 0x7d, 0xfc, 0x0a, // cmp dword [ebp-4], 10
    0x7e, 0x07, // jle +7
    0xb8, 0x01, 0x00, 0x00, 0x00, // mov eax, 1
    0xeb, 0x05, // jmp +5
    0xb8, 0x00, 0x00, 0x00, 0x00, // mov eax, 0
    0x8b, 0xe5, // mov esp, ebp
    0x5d, // pop ebp
    0xc3, // ret
];

/// Larger block for throughput testing (repeated pattern).
fn generate_large_block(size: usize) -> Vec<u8> {
    let mut result = Vec::with_capacity(size);
    while result.len() < size {
        let remaining = size - result.len();
        let to_copy = remaining.min(IA32_CODE.len());
        result.extend_from_slice(&IA32_CODE[..to_copy]);
    }
    result
}

fn bench_single_function(c: &mut Criterion) {
    let disasm = Ia32Disassembler::new(Bitness::Bits32);
    c.bench_function("decode_function", |b| {
        b.iter(|| {
            let results = disasm.disassemble_all(black_box(IA32_CODE), 0x1000);
            black_box(results)
        })
    });
}

fn bench_throughput(c: &mut Criterion) {
    let disasm = Ia32Disassembler::new(Bitness::Bits32);
    let mut group = c.benchmark_group("decode_throughput");
    for size in [4 * 1024usize, 64 * 1024] {
        let block = generate_large_block(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &block, |b, block| {
            b.iter(|| {
                let results = disasm.disassemble_all(black_box(block), 0x1000);
                black_box(results)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_function, bench_throughput);
criterion_main!(benches);
