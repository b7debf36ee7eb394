use crate::{
    model::layer_connection::LayerId,
    utils::{Result, UNetError},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkipStats {
    pub pushes: usize,
    pub pops: usize,
    pub max_depth: usize,
}

/// Last-in-first-out record of encoder outputs awaiting their decoder
/// concatenation.
///
/// The stem output sits in a base slot below the encoder levels: it is set
/// when the stack is created and only handed back by [`SkipStack::finish`],
/// once every level has been popped. `depth` counts encoder levels only.
#[derive(Debug)]
pub struct SkipStack {
    stem: LayerId,
    levels: Vec<LayerId>,
    stats: SkipStats,
}

impl SkipStack {
    pub fn new(stem: LayerId) -> Self {
        Self {
            stem,
            levels: Vec::new(),
            stats: SkipStats::default(),
        }
    }

    pub fn push(&mut self, id: LayerId) {
        self.levels.push(id);
        self.stats.pushes += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.levels.len());
    }

    /// Pops the most recent encoder level. `level` is the decoder iteration
    /// doing the pop and only feeds the error.
    pub fn pop(&mut self, level: usize) -> Result<LayerId> {
        let id = self.levels.pop().ok_or(UNetError::StackUnderflow { level })?;
        self.stats.pops += 1;
        Ok(id)
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn stats(&self) -> SkipStats {
        self.stats
    }

    /// Releases the stem entry. Fails if encoder levels were left unconsumed.
    pub fn finish(self) -> Result<(LayerId, SkipStats)> {
        if !self.levels.is_empty() {
            return Err(UNetError::GraphModel(format!(
                "Skip stack still holds {} encoder levels before the stem concatenation",
                self.levels.len()
            )));
        }

        Ok((self.stem, self.stats))
    }

    // First-in-first-out pop, used by tests to show the decoder depends on
    // the reverse order.
    #[cfg(test)]
    pub(crate) fn pop_oldest(&mut self, level: usize) -> Result<LayerId> {
        if self.levels.is_empty() {
            return Err(UNetError::StackUnderflow { level });
        }
        self.stats.pops += 1;
        Ok(self.levels.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_push_order() {
        let mut stack = SkipStack::new(0);
        stack.push(10);
        stack.push(20);
        stack.push(30);

        assert_eq!(stack.pop(0).unwrap(), 30);
        assert_eq!(stack.pop(1).unwrap(), 20);
        assert_eq!(stack.pop(2).unwrap(), 10);
        assert!(stack.is_empty());

        let (stem, stats) = stack.finish().unwrap();
        assert_eq!(stem, 0);
        assert_eq!(
            stats,
            SkipStats {
                pushes: 3,
                pops: 3,
                max_depth: 3
            }
        );
    }

    #[test]
    fn underflow_reports_level() {
        let mut stack = SkipStack::new(0);
        stack.push(1);
        stack.pop(0).unwrap();
        assert!(matches!(
            stack.pop(1),
            Err(UNetError::StackUnderflow { level: 1 })
        ));
    }

    #[test]
    fn stem_is_not_counted_in_depth() {
        let stack = SkipStack::new(5);
        assert_eq!(stack.depth(), 0);
        assert!(stack.is_empty());
        assert_eq!(stack.finish().unwrap().0, 5);
    }

    #[test]
    fn finish_rejects_leftover_levels() {
        let mut stack = SkipStack::new(0);
        stack.push(1);
        assert!(stack.finish().is_err());
    }

    #[test]
    fn max_depth_survives_pops() {
        let mut stack = SkipStack::new(0);
        stack.push(1);
        stack.push(2);
        stack.pop(0).unwrap();
        stack.push(3);
        assert_eq!(stack.stats().max_depth, 2);
    }
}
