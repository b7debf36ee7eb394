use std::fmt::{Display, Formatter, Result as FmtResult};

pub type LayerId = usize;

// Every layer in this graph has a single output, but connections still name
// the output index so multi-output layers can be wired without a new type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerConnection {
    DefaultOutput(LayerId),
    SpecificOutput(LayerId, usize),
}

impl LayerConnection {
    pub fn get_layerid(&self) -> LayerId {
        match self {
            LayerConnection::DefaultOutput(id) => *id,
            LayerConnection::SpecificOutput(id, _) => *id,
        }
    }

    pub fn get_outputidx(&self) -> usize {
        match self {
            LayerConnection::DefaultOutput(_) => 0,
            LayerConnection::SpecificOutput(_, idx) => *idx,
        }
    }
}

impl From<LayerId> for LayerConnection {
    fn from(id: LayerId) -> Self {
        LayerConnection::DefaultOutput(id)
    }
}

impl Display for LayerConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.get_layerid(), self.get_outputidx())
    }
}
