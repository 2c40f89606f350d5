//! 조립된 파라미터 묶음의 교차 필드 검증.

use crate::assemble::{ParameterBundle, VolumeLimits};

const INITIAL: &str = "Initial Storage Volume";
const START_MIN: &str = "Volume Start (min)";
const START_MAX: &str = "Volume Start (max)";
const TOTAL_MIN: &str = "Total Volume (min)";
const TOTAL_MAX: &str = "Total Volume (max)";
const END_MIN: &str = "Volume End (min)";
const END_MAX: &str = "Volume End (max)";

/// 검증 조건. 평가 순서대로 나열한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// start.min <= initial <= start.max
    InitialWithinStart,
    /// total.min <= initial <= total.max
    InitialWithinTotal,
    /// end.min >= total.min
    EndMinAboveTotalMin,
    /// end.max <= total.max
    EndMaxBelowTotalMax,
}

/// 이름이 붙은 피연산자.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operand {
    pub label: &'static str,
    pub value: f64,
}

/// 위반된 조건과 관련 값.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub check: Check,
    pub operands: Vec<Operand>,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self.check {
            Check::EndMinAboveTotalMin => ">=",
            _ => "<=",
        };
        let relation = self
            .operands
            .iter()
            .map(|o| format!("{} = {}", o.label, o.value))
            .collect::<Vec<_>>()
            .join(&format!(" {op} "));
        write!(
            f,
            "Parameter Input Problem: {relation} not met -> aborting calculation."
        )
    }
}

impl std::error::Error for Violation {}

/// 검증 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(Violation),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

/// 묶음의 저장량 범위 조건을 순서대로 검사한다. 처음 위반된 조건만 보고한다.
pub fn validate(bundle: &ParameterBundle) -> ValidationOutcome {
    validate_volumes(&bundle.volumes)
}

pub fn validate_volumes(v: &VolumeLimits) -> ValidationOutcome {
    let checks = [
        (
            Check::InitialWithinStart,
            v.start.contains(v.initial),
            vec![
                op(START_MIN, v.start.min),
                op(INITIAL, v.initial),
                op(START_MAX, v.start.max),
            ],
        ),
        (
            Check::InitialWithinTotal,
            v.total.contains(v.initial),
            vec![
                op(TOTAL_MIN, v.total.min),
                op(INITIAL, v.initial),
                op(TOTAL_MAX, v.total.max),
            ],
        ),
        (
            Check::EndMinAboveTotalMin,
            v.end.min >= v.total.min,
            vec![op(END_MIN, v.end.min), op(TOTAL_MIN, v.total.min)],
        ),
        (
            Check::EndMaxBelowTotalMax,
            v.end.max <= v.total.max,
            vec![op(END_MAX, v.end.max), op(TOTAL_MAX, v.total.max)],
        ),
    ];
    checks
        .into_iter()
        .find(|(_, holds, _)| !holds)
        .map(|(check, _, operands)| ValidationOutcome::Invalid(Violation { check, operands }))
        .unwrap_or(ValidationOutcome::Valid)
}

fn op(label: &'static str, value: f64) -> Operand {
    Operand { label, value }
}
