#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub cycle: u32,
    pub rfu: f64,
}

pub fn parse_curve(raw: &str) -> Result<Vec<CurvePoint>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let pairs: Vec<(u32, f64)> = serde_json::from_str(trimmed).map_err(|e| e.to_string())?;
    Ok(pairs
        .into_iter()
        .map(|(cycle, rfu)| CurvePoint { cycle, rfu })
        .collect())
}

pub fn endpoint_rfu(curve: &[CurvePoint]) -> f64 {
    curve.last().map(|p| p.rfu).unwrap_or(0.0)
}
