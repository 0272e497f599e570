use ark_bls12_381::Fr as BlsScalar;
use ark_ff::PrimeField;
use plonk_builder::prelude::*;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion,
};

/// Squares a private input until the build holds `degree` rows.
#[derive(Debug)]
pub struct BenchCircuit {
    degree: usize,
}

impl<T: Into<usize>> From<T> for BenchCircuit {
    fn from(degree: T) -> Self {
        Self {
            degree: 1 << degree.into(),
        }
    }
}

impl<F: PrimeField> Circuit<F> for BenchCircuit {
    fn synthesize(
        &self,
        composer: &mut StandardComposer<F>,
        _public: &[FieldVar<F>],
        private: &[FieldVar<F>],
    ) -> Result<Vec<FieldVar<F>>, Error> {
        let mut acc = private[0].clone();
        while composer.n() < self.degree - 1 {
            acc = acc.square(composer)?.add(&private[0]);
        }
        Ok(vec![acc])
    }
}

fn constraint_system_benchmark(c: &mut Criterion) {
    let initial_degree = 5usize;
    let final_degree = 16usize;

    for degree in initial_degree..=final_degree {
        let circuit = BenchCircuit::from(degree);
        let inputs =
            CircuitInputs::new(vec![], vec![BlsScalar::from(3u64)]);

        let description =
            format!("Prover build 2^{} = {} gates", degree, 1 << degree);
        c.bench_with_input(
            BenchmarkId::new(description.as_str(), degree),
            &degree,
            |b, _degree| {
                b.iter(|| {
                    run_in_prover(black_box(&circuit), black_box(&inputs))
                        .unwrap()
                })
            },
        );

        let description =
            format!("Analysis build 2^{} = {} gates", degree, 1 << degree);
        c.bench_with_input(
            BenchmarkId::new(description.as_str(), degree),
            &degree,
            |b, _degree| {
                b.iter(|| {
                    run_in_analysis::<BlsScalar, _>(
                        black_box(&circuit),
                        black_box(inputs.shape()),
                    )
                    .unwrap()
                })
            },
        );
    }
}

criterion_group! {
    name = plonk_builder;
    config = Criterion::default().sample_size(10);
    targets = constraint_system_benchmark
}
criterion_main!(plonk_builder);
