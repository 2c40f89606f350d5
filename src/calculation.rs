//! 검증을 통과한 파라미터 묶음을 받는 외부 계산.

use tracing::info;

use crate::assemble::ParameterBundle;

/// 외부 계산이 보고한 오류. 내용은 해석하지 않고 그대로 전달한다.
#[derive(Debug)]
pub struct CalculationError(pub Box<dyn std::error::Error + Send + Sync>);

impl std::fmt::Display for CalculationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "계산 오류: {}", self.0)
    }
}

impl std::error::Error for CalculationError {}

impl From<serde_json::Error> for CalculationError {
    fn from(value: serde_json::Error) -> Self {
        CalculationError(Box::new(value))
    }
}

/// 완성된 파라미터 묶음을 소비하는 계산.
pub trait Calculation {
    fn run(&mut self, bundle: &ParameterBundle) -> Result<(), CalculationError>;
}

/// 실제 계산 대신 묶음을 로그로 남긴다.
#[derive(Debug, Default, Clone)]
pub struct LoggingCalculation {
    runs: usize,
}

impl LoggingCalculation {
    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl Calculation for LoggingCalculation {
    fn run(&mut self, bundle: &ParameterBundle) -> Result<(), CalculationError> {
        let params = serde_json::to_string(bundle)?;
        self.runs += 1;
        info!(profile = %bundle.profile, %params, "calculation parameters");
        Ok(())
    }
}
