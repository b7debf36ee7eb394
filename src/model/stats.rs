use std::fmt::Write;

use crate::{
    layer::layer::LayerKind,
    utils::{Result, UNetError},
};

use super::{graph_model::GraphModel, layer_connection::LayerConnection};

/// Renders a per-layer table of the verified model plus totals.
pub fn model_summary(model: &GraphModel) -> Result<String> {
    let verified = model.verified.as_ref().ok_or_else(|| {
        UNetError::GraphModel("Model not verified, execution order unknown".into())
    })?;

    let mut out = String::new();
    let mut total_memory = 0u64;

    writeln!(out, "Model Statistics")?;
    writeln!(out, "================")?;
    writeln!(out, "Batch Size: {}", model.batch_size)?;
    writeln!(out, "{:-<125}", "")?;
    writeln!(
        out,
        "{:<4} {:<16} {:<10} {:<20} {:<10} {:<24} {}",
        "ID", "Type", "Memory", "Output Shape", "Params", "Connections", "Config"
    )?;
    writeln!(out, "{:-<125}", "")?;

    for &layer_id in &verified.execution_order {
        let Some(layer) = model.layers.get(&layer_id) else {
            continue;
        };

        let input_shapes = layer.input_shapes(model)?;
        let params = layer.layer.parameter_count(&input_shapes);

        let output_shape = layer
            .output_shapes
            .first()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let activation_bytes = layer
            .output_shapes
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.size_in_bytes() as u64));
        let param_bytes = (params as u64).saturating_mul(std::mem::size_of::<f32>() as u64);
        let memory_bytes = activation_bytes.saturating_add(param_bytes);

        writeln!(
            out,
            "{:<4} {:<16} {:<10} {:<20} {:<10} {:<24} {}",
            layer_id,
            layer.layer.name(),
            format_memory_mb(memory_bytes),
            output_shape,
            params,
            format_layer_connections(&layer.input_connections, &layer.output_connections),
            layer.layer.config_string().unwrap_or_default()
        )?;

        total_memory = total_memory.saturating_add(memory_bytes);
    }

    writeln!(out, "{:-<125}", "")?;
    writeln!(out, "Entry points: {:?}", verified.entry_points)?;
    writeln!(out, "Exit points: {:?}", verified.exit_points)?;
    writeln!(
        out,
        "Layers: {} conv, {} transposed conv, {} pool, {} batch-norm, {} concat",
        model.count(LayerKind::Conv),
        model.count(LayerKind::ConvTranspose),
        model.count(LayerKind::MaxPool),
        model.count(LayerKind::BatchNorm),
        model.count(LayerKind::Concat)
    )?;
    writeln!(out, "Total Parameters: {}", model.parameter_count()?)?;
    writeln!(out, "Total Memory: {}", format_memory_mb(total_memory))?;

    if let Some(compiled) = &model.compiled {
        writeln!(
            out,
            "Compiled: optimizer={}, loss={}, metrics=[{}]",
            compiled.optimizer.name(),
            compiled.loss.name(),
            compiled
                .metrics
                .iter()
                .map(|m| m.name())
                .collect::<Vec<_>>()
                .join(", ")
        )?;
    }

    Ok(out)
}

pub fn format_memory_mb(bytes: u64) -> String {
    format!("{:.2} MiB", bytes as f64 / (1024.0 * 1024.0))
}

fn format_layer_connections(inputs: &[LayerConnection], outputs: &[LayerConnection]) -> String {
    let in_ids: Vec<String> = inputs.iter().map(|conn| conn.to_string()).collect();
    let out_ids: Vec<String> = outputs.iter().map(|conn| conn.to_string()).collect();

    if in_ids.is_empty() && out_ids.is_empty() {
        return "None".to_string();
    }

    let mut result = String::new();

    if !in_ids.is_empty() {
        result.push_str(&format!("in:[{}]", in_ids.join(",")));
    }

    if !out_ids.is_empty() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(&format!("out:[{}]", out_ids.join(",")));
    }

    result
}
