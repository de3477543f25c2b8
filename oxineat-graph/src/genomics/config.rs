use crate::genomics::ActivationType;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Metadata shared by every genome of a population.
///
/// A `MetaGenome` is read-only to genome compilation: it
/// fixes the shape of the node id space and selects which
/// compilation pipeline a genome goes through.
///
/// # Note
/// Input nodes are assigned ids `[0, input_count)` and output
/// nodes ids `[input_count, input_count + output_count)`. All
/// other node ids belong to hidden nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaGenome {
    /// Number of inputs in a genome.
    pub input_count: NonZeroUsize,
    /// Number of outputs in a genome.
    pub output_count: NonZeroUsize,
    /// Whether genomes are restricted to feed-forward
    /// (acyclic) connectivity. Acyclic genomes are compiled
    /// into depth-ordered graphs.
    pub is_acyclic: bool,
    /// Maximum magnitude of a connection weight.
    pub connection_weight_scale: f32,
    /// Activation function applied by the network
    /// built from the genome.
    pub activation_type: ActivationType,
}

impl MetaGenome {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0 or `false`, with the exception of
    /// `NonZeroUsize`s, which are 1, and the activation type,
    /// which is [`Sigmoid`].
    ///
    /// [`Sigmoid`]: crate::genomics::ActivationType
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::MetaGenome;
    ///
    /// let meta1 = MetaGenome::zero();
    ///
    /// let meta2 = MetaGenome {
    ///     // Specify some values here...
    ///     is_acyclic: true,
    ///     connection_weight_scale: 5.0,
    ///     // Default the rest...
    ///     ..MetaGenome::zero()
    /// };
    /// ```
    pub const fn zero() -> MetaGenome {
        MetaGenome {
            input_count: NonZeroUsize::MIN,
            output_count: NonZeroUsize::MIN,
            is_acyclic: false,
            connection_weight_scale: 0.0,
            activation_type: ActivationType::Sigmoid,
        }
    }

    /// Returns the number of fixed (input and output) nodes.
    /// This is also the lowest id a hidden node can have.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::MetaGenome;
    /// use std::num::NonZeroUsize;
    ///
    /// let meta = MetaGenome {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     ..MetaGenome::zero()
    /// };
    ///
    /// assert_eq!(meta.input_output_count(), 5);
    /// ```
    pub fn input_output_count(&self) -> usize {
        self.input_count.get() + self.output_count.get()
    }
}
