use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::{
    layer::layer::{Layer, LayerKind},
    tensor::TensorDesc,
    utils::{Result, UNetError},
};

use super::{
    compile::CompileConfig,
    layer_connection::{LayerConnection, LayerId},
};

pub struct GraphModelLayer {
    pub id: LayerId,
    pub layer: Box<dyn Layer>,
    pub input_connections: Vec<LayerConnection>,
    pub output_connections: Vec<LayerConnection>,
    pub output_shapes: Vec<TensorDesc>,
}

impl GraphModelLayer {
    pub fn input_shapes<'a>(&self, model: &'a GraphModel) -> Result<Vec<&'a TensorDesc>> {
        self.input_connections
            .iter()
            .map(|conn| model.connection_shape(conn))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedModel {
    pub execution_order: Vec<LayerId>,
    pub entry_points: Vec<LayerId>,
    pub exit_points: Vec<LayerId>,
}

/// A DAG of layers with shapes inferred as layers are added.
///
/// Inputs can only reference layers that already exist, so a shape error
/// surfaces on the `add_layer_with` call that introduces it.
pub struct GraphModel {
    pub batch_size: usize,
    pub layers: HashMap<LayerId, GraphModelLayer>,
    pub verified: Option<VerifiedModel>,
    pub compiled: Option<CompileConfig>,
    next_id: LayerId,
}

impl GraphModel {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            layers: HashMap::new(),
            verified: None,
            compiled: None,
            next_id: 0,
        }
    }

    pub fn add_layer(&mut self, layer: Box<dyn Layer>) -> Result<LayerId> {
        self.add_layer_with(layer, Vec::new())
    }

    pub fn add_layer_with(
        &mut self,
        layer: Box<dyn Layer>,
        input_connections: Vec<LayerConnection>,
    ) -> Result<LayerId> {
        let id = self.next_id;

        let (min_inputs, max_inputs) = layer.input_requirements();
        let count = input_connections.len();
        if count < min_inputs || max_inputs.is_some_and(|max| count > max) {
            return Err(UNetError::GraphModel(format!(
                "{} layer {} accepts {}..{} inputs, got {}",
                layer.name(),
                id,
                min_inputs,
                max_inputs.map_or("∞".to_string(), |m| m.to_string()),
                count
            )));
        }

        let output_shapes = {
            let input_shapes = input_connections
                .iter()
                .map(|conn| self.connection_shape(conn))
                .collect::<Result<Vec<&TensorDesc>>>()?;
            layer.output_shapes(self.batch_size, &input_shapes)?
        };

        debug!(
            "layer {} {} -> {}",
            id,
            layer.name(),
            output_shapes
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        for conn in &input_connections {
            if let Some(source) = self.layers.get_mut(&conn.get_layerid()) {
                source.output_connections.push(LayerConnection::DefaultOutput(id));
            }
        }

        self.layers.insert(
            id,
            GraphModelLayer {
                id,
                layer,
                input_connections,
                output_connections: Vec::new(),
                output_shapes,
            },
        );
        self.next_id += 1;
        self.verified = None;
        self.compiled = None;

        Ok(id)
    }

    fn connection_shape(&self, conn: &LayerConnection) -> Result<&TensorDesc> {
        let source = self.layers.get(&conn.get_layerid()).ok_or_else(|| {
            UNetError::GraphModel(format!("Connection {} refers to a missing layer", conn))
        })?;

        source.output_shapes.get(conn.get_outputidx()).ok_or_else(|| {
            UNetError::GraphModel(format!(
                "Connection {} refers to output {} of {} which has {} outputs",
                conn,
                conn.get_outputidx(),
                source.layer.name(),
                source.output_shapes.len()
            ))
        })
    }

    pub fn output_shape(&self, id: LayerId) -> Result<&TensorDesc> {
        self.connection_shape(&LayerConnection::DefaultOutput(id))
    }

    pub fn layer(&self, id: LayerId) -> Option<&GraphModelLayer> {
        self.layers.get(&id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn count(&self, kind: LayerKind) -> usize {
        self.layers
            .values()
            .filter(|l| l.layer.kind() == kind)
            .count()
    }

    pub fn parameter_count(&self) -> Result<usize> {
        let mut total = 0;
        for layer in self.layers.values() {
            let input_shapes = layer.input_shapes(self)?;
            total = layer.layer.parameter_count(&input_shapes).saturating_add(total);
        }
        Ok(total)
    }

    /// Checks connectivity and computes a topological execution order.
    pub fn verify(&mut self) -> Result<&VerifiedModel> {
        if self.layers.is_empty() {
            return Err(UNetError::GraphModel("Model has no layers".into()));
        }

        let mut in_degree: HashMap<LayerId, usize> = HashMap::with_capacity(self.layers.len());
        for (&id, layer) in &self.layers {
            for conn in &layer.input_connections {
                if !self.layers.contains_key(&conn.get_layerid()) {
                    return Err(UNetError::GraphModel(format!(
                        "Layer {} has input {} that does not exist",
                        id, conn
                    )));
                }
            }
            in_degree.insert(id, layer.input_connections.len());
        }

        let mut entry_points: Vec<LayerId> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();
        entry_points.sort_unstable();

        let mut exit_points: Vec<LayerId> = self
            .layers
            .values()
            .filter(|l| l.output_connections.is_empty())
            .map(|l| l.id)
            .collect();
        exit_points.sort_unstable();

        // Kahn's algorithm, smallest id first so the order is deterministic
        let mut queue: VecDeque<LayerId> = entry_points.iter().copied().collect();
        let mut execution_order = Vec::with_capacity(self.layers.len());

        while let Some(id) = queue.pop_front() {
            execution_order.push(id);

            let mut ready = Vec::new();
            for conn in &self.layers[&id].output_connections {
                let consumer = conn.get_layerid();
                if let Some(deg) = in_degree.get_mut(&consumer) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(consumer);
                    }
                }
            }
            ready.sort_unstable();
            queue.extend(ready);
        }

        if execution_order.len() != self.layers.len() {
            return Err(UNetError::GraphModel(format!(
                "Model contains a cycle, ordered {} of {} layers",
                execution_order.len(),
                self.layers.len()
            )));
        }

        Ok(self.verified.insert(VerifiedModel {
            execution_order,
            entry_points,
            exit_points,
        }))
    }

    /// Attaches the optimisation setup to a verified model.
    pub fn compile(&mut self, config: CompileConfig) -> Result<()> {
        if self.verified.is_none() {
            return Err(UNetError::GraphModel(
                "Model must be verified before it is compiled".into(),
            ));
        }

        self.compiled = Some(config);
        Ok(())
    }
}
