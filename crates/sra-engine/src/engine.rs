use sra_domain::{
    AllowanceState, PendingApprovalState, SwapError, SwapParameters, SwapState, TradeState,
};

/// Snapshot of every upstream signal at evaluation time.
#[derive(Clone, Debug)]
pub struct ReadinessInput<'a> {
    pub trade: &'a TradeState,
    /// `None` until the allowance source has reported for the current token.
    pub allowance: Option<&'a AllowanceState>,
    pub pending_approval: PendingApprovalState,
    pub amount_in_micros: i64,
    pub balance_in_micros: Option<i64>,
    /// Input token requires a reset-to-zero before raising its allowance.
    pub must_revoke: bool,
}

/// Result of one evaluation, before the publish rule is applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub loading: bool,
    /// Full error list, in discovery order: trade, allowance, balance.
    pub errors: Vec<SwapError>,
    pub parameters: Option<SwapParameters>,
}

impl Evaluation {
    /// Loading wins over everything; ready needs parameters and no errors.
    pub fn verdict(&self) -> SwapState {
        if self.loading {
            return SwapState::Loading;
        }
        match &self.parameters {
            Some(p) if self.errors.is_empty() => SwapState::Ready(p.clone()),
            _ => SwapState::NotReady,
        }
    }
}

/// Allowance-sufficiency check.
///
/// Only reports when the balance is known and covers the input amount, and
/// the allowance does not. An unknown or insufficient balance is reported by
/// the balance check instead.
pub fn check_allowance(
    amount_in_micros: i64,
    balance_in_micros: Option<i64>,
    allowance_micros: i64,
    must_revoke: bool,
) -> Option<SwapError> {
    let balance_in = balance_in_micros?;
    if amount_in_micros > balance_in || amount_in_micros <= allowance_micros {
        return None;
    }

    if must_revoke && allowance_micros != 0 {
        return Some(SwapError::NeedRevokeAllowance { allowance_micros });
    }

    Some(SwapError::InsufficientAllowance)
}

/// Deterministic evaluation of one upstream snapshot.
///
/// - trade `Loading` / allowance `Loading` / approval `Pending` => loading
/// - trade `NotReady` and allowance `NotReady` errors pass through verbatim
/// - allowance `Ready` => allowance-sufficiency check
/// - balance check always runs
pub fn evaluate(inp: &ReadinessInput<'_>) -> Evaluation {
    let mut loading = false;
    let mut errors: Vec<SwapError> = Vec::new();
    let mut parameters: Option<SwapParameters> = None;

    // 1) Trade quote
    match inp.trade {
        TradeState::Loading => loading = true,
        TradeState::Ready(p) => parameters = Some(p.clone()),
        TradeState::NotReady(es) => errors.extend(es.iter().cloned()),
    }

    // 2) Allowance
    match inp.allowance {
        Some(AllowanceState::Loading) => loading = true,
        Some(AllowanceState::Ready { allowance_micros }) => {
            if let Some(e) = check_allowance(
                inp.amount_in_micros,
                inp.balance_in_micros,
                *allowance_micros,
                inp.must_revoke,
            ) {
                errors.push(e);
            }
        }
        Some(AllowanceState::NotReady(e)) => errors.push(e.clone()),
        None => {}
    }

    // 3) Balance
    match inp.balance_in_micros {
        Some(balance_in) if inp.amount_in_micros > balance_in => {
            errors.push(SwapError::InsufficientBalanceIn)
        }
        Some(_) => {}
        None => errors.push(SwapError::NoBalanceIn),
    }

    // 4) Pending approval
    if inp.pending_approval == PendingApprovalState::Pending {
        loading = true;
    }

    Evaluation {
        loading,
        errors,
        parameters,
    }
}
