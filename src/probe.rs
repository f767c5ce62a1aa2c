use serde::{Deserialize, Serialize};

use crate::mutants::{Implementation, Outcome};

#[derive(Debug, Clone, Copy)]
pub struct ProbeConfig {
    pub seed: u64,
    /// Random vectors tried after the fixed shapes.
    pub attempts: usize,
    pub max_len: usize,
    pub min_value: i32,
    pub max_value: i32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            seed: 0x6d75_746a,
            attempts: 500,
            max_len: 12,
            min_value: -9,
            max_value: 9,
        }
    }
}

/// An input on which a surviving mutant disagrees with the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub input: Vec<i32>,
    pub reference_output: Outcome,
    pub mutant_output: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivorHint {
    pub mutant_id: String,
    /// `None` means nothing within the probe budget told the two apart.
    pub witness: Option<Witness>,
}

/// Edge-case shapes that separate most integer-sequence bugs.
fn shapes() -> Vec<Vec<i32>> {
    vec![
        vec![],
        vec![7],
        vec![3, 3, 3, 3],
        vec![5, 4, 3, 2, 1],
        vec![1, 2, 3, 4],
        vec![1, 2, 3, 4, 1, 2],
        vec![4, 1, 2],
        vec![-3, -2, -1, 0],
        vec![1, 2, 2, 3],
        vec![2, 1],
    ]
}

fn random_input(rng: &mut fastrand::Rng, config: &ProbeConfig) -> Vec<i32> {
    let len = rng.usize(0..=config.max_len);
    (0..len)
        .map(|_| rng.i32(config.min_value..=config.max_value))
        .collect()
}

/// Search for an input on which `mutant` and `reference` disagree: fixed
/// shapes first, then seeded random vectors. Deterministic for a fixed seed.
pub fn find_witness(reference: &Implementation, mutant: &Implementation, config: &ProbeConfig) -> Option<Witness> {
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let random = (0..config.attempts).map(|_| random_input(&mut rng, config));
    shapes().into_iter().chain(random).find_map(|input| {
        let reference_output = reference.evaluate(&input);
        let mutant_output = mutant.evaluate(&input);
        if reference_output.same_as(&mutant_output) {
            None
        } else {
            Some(Witness {
                input,
                reference_output,
                mutant_output,
            })
        }
    })
}

/// One hint per survivor id, in the order given.
pub fn hints<'a>(
    reference: &Implementation,
    survivors: impl IntoIterator<Item = &'a Implementation>,
    config: &ProbeConfig,
) -> Vec<SurvivorHint> {
    survivors
        .into_iter()
        .map(|mutant| {
            let witness = find_witness(reference, mutant, config);
            if witness.is_none() {
                tracing::debug!(mutant = mutant.id(), "no witness found; possibly equivalent");
            }
            SurvivorHint {
                mutant_id: mutant.id().to_string(),
                witness,
            }
        })
        .collect()
}
