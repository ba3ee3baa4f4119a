//! ZABRモデル実装
//!
//! ZABRモデルはSABRのボラティリティ過程に指数gammaを加えた拡張:
//! ```text
//! dF = alpha * F^beta * dW_F
//! d(alpha) = nu * alpha^gamma * dW_alpha
//! E[dW_F * dW_alpha] = rho * dt
//! ```
//! ここで:
//! - F = フォワード
//! - alpha = 瞬間ボラティリティ
//! - beta = CEVパラメータ
//! - nu = ボラティリティのボラティリティ (vol-of-vol)
//! - rho = フォワードとボラティリティの相関
//! - gamma = ボラティリティ過程の指数 (gamma = 1 でSABRに一致)
//!
//! ## 評価モード
//!
//! - `ShortMaturityLognormal`: 短期満期展開による対数正規ボラティリティ
//! - `ShortMaturityNormal`: 同じ展開による正規ボラティリティ
//! - `HaganLognormal`: Hagan et al. (2002) の公式 (gammaは使用しない)
//!
//! 短期満期展開では y(K) から x(K) への常微分方程式を固定刻みの
//! 4次Runge-Kutta法で積分する。刻み数が固定なので結果はパラメータに
//! 対して滑らかになる。
//!
//! ## 使用例
//!
//! ```
//! use smile_models::models::zabr::{zabr_volatility, MarketContext, ZabrEvaluation, ZabrParams};
//!
//! let params = ZabrParams::new(0.2, 1.0, 0.4, -0.3, 1.0);
//! let context = MarketContext::new(1.0, 100.0).unwrap();
//!
//! // ATMでは alpha * F^(beta - 1)
//! let atm = zabr_volatility(&params, &context, 100.0, ZabrEvaluation::ShortMaturityLognormal);
//! assert!((atm - 0.2).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationError;

/// ATM判定の相対許容誤差
const ATM_TOLERANCE: f64 = 1e-12;

/// Runge-Kutta法の刻み数
const RK4_STEPS: usize = 64;

/// ZABRモデルパラメータ
///
/// 順序は `[alpha, beta, nu, rho, gamma]`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZabrParams {
    /// 瞬間ボラティリティ (alpha > 0)
    pub alpha: f64,
    /// CEVパラメータ (0 < beta <= 1)
    pub beta: f64,
    /// vol-of-vol (nu >= 0)
    pub nu: f64,
    /// 相関 (-1 < rho < 1)
    pub rho: f64,
    /// ボラティリティ過程の指数 (gamma >= 0)
    pub gamma: f64,
}

impl Default for ZabrParams {
    /// 既定値: alpha = sqrt(0.2), beta = 0.5, nu = sqrt(0.4), rho = 0, gamma = 1
    fn default() -> Self {
        Self {
            alpha: 0.2_f64.sqrt(),
            beta: 0.5,
            nu: 0.4_f64.sqrt(),
            rho: 0.0,
            gamma: 1.0,
        }
    }
}

impl ZabrParams {
    /// パラメータ数
    pub const COUNT: usize = 5;

    /// 新しいパラメータを作成 (検証なし)
    pub fn new(alpha: f64, beta: f64, nu: f64, rho: f64, gamma: f64) -> Self {
        Self {
            alpha,
            beta,
            nu,
            rho,
            gamma,
        }
    }

    /// `[alpha, beta, nu, rho, gamma]` から作成
    pub fn from_array(values: [f64; 5]) -> Self {
        let [alpha, beta, nu, rho, gamma] = values;
        Self::new(alpha, beta, nu, rho, gamma)
    }

    /// `[alpha, beta, nu, rho, gamma]` に変換
    pub fn to_array(&self) -> [f64; 5] {
        [self.alpha, self.beta, self.nu, self.rho, self.gamma]
    }

    /// 各パラメータが定義域内にあるか検証
    ///
    /// # エラー
    ///
    /// 定義域外または非有限の値に対して `CalibrationError::InvalidInput` を返す。
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for (name, value) in ["alpha", "beta", "nu", "rho", "gamma"]
            .iter()
            .zip(self.to_array())
        {
            check_parameter(name, value)?;
        }
        Ok(())
    }
}

/// 単一パラメータの定義域チェック
pub(crate) fn check_parameter(name: &str, value: f64) -> Result<(), CalibrationError> {
    let in_domain = match name {
        "alpha" => value > 0.0,
        "nu" | "gamma" => value >= 0.0,
        "beta" => value > 0.0 && value <= 1.0,
        "rho" => value > -1.0 && value < 1.0,
        _ => true,
    };
    if value.is_finite() && in_domain {
        Ok(())
    } else {
        Err(CalibrationError::invalid_input(format!(
            "{} = {} is outside its domain",
            name, value
        )))
    }
}

/// 市場コンテキスト (満期とフォワードのスナップショット)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// 満期までの年数 (> 0)
    pub expiry: f64,
    /// フォワード (> 0)
    pub forward: f64,
}

impl MarketContext {
    /// 検証付きで作成
    ///
    /// # エラー
    ///
    /// 満期またはフォワードが正の有限値でない場合 `CalibrationError::InvalidInput`。
    pub fn new(expiry: f64, forward: f64) -> Result<Self, CalibrationError> {
        let context = Self { expiry, forward };
        context.validate()?;
        Ok(context)
    }

    /// 満期とフォワードが正の有限値か検証
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !(self.expiry.is_finite() && self.expiry > 0.0) {
            return Err(CalibrationError::invalid_input(format!(
                "expiry must be positive, got {}",
                self.expiry
            )));
        }
        if !(self.forward.is_finite() && self.forward > 0.0) {
            return Err(CalibrationError::invalid_input(format!(
                "forward must be positive, got {}",
                self.forward
            )));
        }
        Ok(())
    }
}

/// ボラティリティ評価モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZabrEvaluation {
    /// 短期満期展開 (対数正規ボラティリティ)
    #[default]
    ShortMaturityLognormal,
    /// 短期満期展開 (正規ボラティリティ)
    ShortMaturityNormal,
    /// Hagan公式 (対数正規ボラティリティ, gammaは無視)
    HaganLognormal,
}

impl ZabrEvaluation {
    /// 正規ボラティリティを返すモードか
    pub fn is_normal(&self) -> bool {
        matches!(self, ZabrEvaluation::ShortMaturityNormal)
    }

    /// ログ・レポート用のラベル
    pub fn as_str(&self) -> &'static str {
        match self {
            ZabrEvaluation::ShortMaturityLognormal => "short_maturity_lognormal",
            ZabrEvaluation::ShortMaturityNormal => "short_maturity_normal",
            ZabrEvaluation::HaganLognormal => "hagan_lognormal",
        }
    }
}

impl std::fmt::Display for ZabrEvaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ZabrEvaluation {
    type Err = CalibrationError;

    /// `as_str` のラベル (ハイフン区切りも可) から解析
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "short_maturity_lognormal" | "lognormal" => Ok(ZabrEvaluation::ShortMaturityLognormal),
            "short_maturity_normal" | "normal" => Ok(ZabrEvaluation::ShortMaturityNormal),
            "hagan_lognormal" | "hagan" => Ok(ZabrEvaluation::HaganLognormal),
            _ => Err(CalibrationError::invalid_input(format!(
                "unknown evaluation mode: {}",
                s
            ))),
        }
    }
}

/// ストライク `strike` におけるモデルボラティリティ
///
/// 純粋関数。入力の検証は行わないため、定義域外の入力では非有限値が
/// 返ることがある。
pub fn zabr_volatility(
    params: &ZabrParams,
    context: &MarketContext,
    strike: f64,
    evaluation: ZabrEvaluation,
) -> f64 {
    let forward = context.forward;
    let at_the_money = (forward - strike).abs() < ATM_TOLERANCE * forward;

    match evaluation {
        ZabrEvaluation::ShortMaturityLognormal => {
            if at_the_money {
                params.alpha * forward.powf(params.beta - 1.0)
            } else {
                (forward / strike).ln() / short_maturity_x(params, forward, strike)
            }
        }
        ZabrEvaluation::ShortMaturityNormal => {
            if at_the_money {
                params.alpha * forward.powf(params.beta)
            } else {
                (forward - strike) / short_maturity_x(params, forward, strike)
            }
        }
        ZabrEvaluation::HaganLognormal => {
            if at_the_money {
                hagan_atm_vol(forward, context.expiry, params)
            } else {
                hagan_vol(forward, strike, context.expiry, params)
            }
        }
    }
}

/// y(K) = (F^(1-beta) - K^(1-beta)) * alpha^(gamma-2) / (1-beta)
fn short_maturity_y(params: &ZabrParams, forward: f64, strike: f64) -> f64 {
    let scale = params.alpha.powf(params.gamma - 2.0);
    let one_minus_beta = 1.0 - params.beta;
    if one_minus_beta.abs() < ATM_TOLERANCE {
        (forward / strike).ln() * scale
    } else {
        (forward.powf(one_minus_beta) - strike.powf(one_minus_beta)) * scale / one_minus_beta
    }
}

/// dx/dy の右辺
fn short_maturity_rhs(params: &ZabrParams, y: f64, u: f64) -> f64 {
    let gamma_m2 = params.gamma - 2.0;
    let one_m_gamma = 1.0 - params.gamma;
    let nu = params.nu;
    let nu2 = nu * nu;

    let a = 1.0 + gamma_m2 * gamma_m2 * nu2 * y * y + 2.0 * params.rho * gamma_m2 * nu * y;
    let b = 2.0 * params.rho * one_m_gamma * nu + 2.0 * one_m_gamma * gamma_m2 * nu2 * y;
    let c = one_m_gamma * one_m_gamma * nu2;

    let discriminant = (b * b * u * u - 4.0 * a * (c * u * u - 1.0)).max(0.0);
    (-b * u + discriminant.sqrt()) / (2.0 * a)
}

/// x(K): dx/dy を 0 から y(K) まで積分し alpha^(1-gamma) を掛ける
fn short_maturity_x(params: &ZabrParams, forward: f64, strike: f64) -> f64 {
    let y_end = short_maturity_y(params, forward, strike);
    let h = y_end / RK4_STEPS as f64;

    let mut y = 0.0;
    let mut x = 0.0;
    for _ in 0..RK4_STEPS {
        let k1 = short_maturity_rhs(params, y, x);
        let k2 = short_maturity_rhs(params, y + 0.5 * h, x + 0.5 * h * k1);
        let k3 = short_maturity_rhs(params, y + 0.5 * h, x + 0.5 * h * k2);
        let k4 = short_maturity_rhs(params, y + h, x + h * k3);
        x += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        y += h;
    }

    x * params.alpha.powf(1.0 - params.gamma)
}

/// Hagan公式によるSABRインプライドボラティリティ
fn hagan_vol(forward: f64, strike: f64, expiry: f64, params: &ZabrParams) -> f64 {
    let ZabrParams {
        alpha,
        beta,
        nu,
        rho,
        ..
    } = *params;
    let eps = 1e-10;

    let one_minus_beta = 1.0 - beta;
    let log_fk = (forward / strike).ln();
    let fk_mid = (forward * strike).powf(one_minus_beta / 2.0);

    // z = (nu/alpha) * (FK)^((1-beta)/2) * ln(F/K)
    let z = (nu / alpha) * fk_mid * log_fk;

    // chi(z) = ln[(sqrt(1-2*rho*z+z^2)+z-rho)/(1-rho)]
    let sqrt_term = (1.0 - 2.0 * rho * z + z * z).sqrt();
    let chi_z = ((sqrt_term + z - rho) / (1.0 - rho)).ln();

    let z_over_chi = if chi_z.abs() < eps { 1.0 } else { z / chi_z };

    let log_fk_2 = log_fk * log_fk;
    let log_fk_4 = log_fk_2 * log_fk_2;
    let one_minus_beta_2 = one_minus_beta * one_minus_beta;
    let one_minus_beta_4 = one_minus_beta_2 * one_minus_beta_2;

    let denom =
        1.0 + one_minus_beta_2 * log_fk_2 / 24.0 + one_minus_beta_4 * log_fk_4 / 1920.0;

    (alpha / fk_mid) * z_over_chi * hagan_time_correction(fk_mid * fk_mid, expiry, params) / denom
}

/// ATMでのHagan公式
fn hagan_atm_vol(forward: f64, expiry: f64, params: &ZabrParams) -> f64 {
    let f_pow = forward.powf(1.0 - params.beta);
    (params.alpha / f_pow) * hagan_time_correction(f_pow * f_pow, expiry, params)
}

/// 1 + [(1-beta)^2 alpha^2 / (24 (FK)^(1-beta)) + rho beta nu alpha / (4 (FK)^((1-beta)/2))
///      + (2 - 3 rho^2) nu^2 / 24] T
fn hagan_time_correction(fk_pow: f64, expiry: f64, params: &ZabrParams) -> f64 {
    let ZabrParams {
        alpha,
        beta,
        nu,
        rho,
        ..
    } = *params;
    let one_minus_beta = 1.0 - beta;

    let term1 = one_minus_beta * one_minus_beta * alpha * alpha / (24.0 * fk_pow);
    let term2 = 0.25 * rho * beta * nu * alpha / fk_pow.sqrt();
    let term3 = (2.0 - 3.0 * rho * rho) * nu * nu / 24.0;

    1.0 + (term1 + term2 + term3) * expiry
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn context() -> MarketContext {
        MarketContext::new(1.0, 0.04).unwrap()
    }

    /// SABRのリーディングオーダー (Hagan公式の T -> 0 極限, beta = 1)
    fn sabr_lognormal_beta_one(forward: f64, strike: f64, alpha: f64, nu: f64, rho: f64) -> f64 {
        let z = nu / alpha * (forward / strike).ln();
        let chi = ((1.0 - 2.0 * rho * z + z * z).sqrt() + z - rho).ln() - (1.0 - rho).ln();
        alpha * z / chi
    }

    // ========================================
    // ZabrParams Tests
    // ========================================

    #[test]
    fn test_default_params() {
        let params = ZabrParams::default();
        assert_relative_eq!(params.alpha, 0.2_f64.sqrt());
        assert_eq!(params.beta, 0.5);
        assert_relative_eq!(params.nu, 0.4_f64.sqrt());
        assert_eq!(params.rho, 0.0);
        assert_eq!(params.gamma, 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_array_conversion() {
        let values = [0.1, 0.7, 0.3, -0.2, 1.3];
        assert_eq!(ZabrParams::from_array(values).to_array(), values);
    }

    #[test]
    fn test_validate_rejects_out_of_domain() {
        let base = ZabrParams::default();
        assert!(ZabrParams { gamma: -0.1, ..base }.validate().is_err());
        assert!(ZabrParams { beta: 0.0, ..base }.validate().is_err());
        assert!(ZabrParams { beta: 1.1, ..base }.validate().is_err());
        assert!(ZabrParams { rho: 1.0, ..base }.validate().is_err());
        assert!(ZabrParams { alpha: -1e-3, ..base }.validate().is_err());
        assert!(ZabrParams { nu: f64::NAN, ..base }.validate().is_err());
        assert!(ZabrParams { beta: 1.0, ..base }.validate().is_ok());
    }

    // ========================================
    // MarketContext Tests
    // ========================================

    #[test]
    fn test_context_validation() {
        assert!(MarketContext::new(1.0, 0.04).is_ok());
        assert!(MarketContext::new(0.0, 0.04).unwrap_err().is_input_error());
        assert!(MarketContext::new(1.0, -0.01).unwrap_err().is_input_error());
        assert!(MarketContext::new(f64::INFINITY, 0.04).is_err());
    }

    // ========================================
    // Short maturity expansion Tests
    // ========================================

    #[test]
    fn test_lognormal_atm_limit() {
        let params = ZabrParams::new(0.02, 0.5, 0.4, -0.3, 1.3);
        let ctx = context();
        let atm = zabr_volatility(&params, &ctx, 0.04, ZabrEvaluation::ShortMaturityLognormal);
        assert_relative_eq!(atm, 0.02 * 0.04_f64.powf(-0.5), max_relative = 1e-14);

        // Continuous through the money
        let strike = 0.04 * (1.0 + 1e-6);
        let near = zabr_volatility(&params, &ctx, strike, ZabrEvaluation::ShortMaturityLognormal);
        assert_relative_eq!(near, atm, max_relative = 1e-4);
    }

    #[test]
    fn test_normal_atm_limit() {
        let params = ZabrParams::new(0.02, 0.5, 0.4, -0.3, 0.8);
        let ctx = context();
        let atm = zabr_volatility(&params, &ctx, 0.04, ZabrEvaluation::ShortMaturityNormal);
        assert_relative_eq!(atm, 0.02 * 0.04_f64.sqrt(), max_relative = 1e-14);

        let strike = 0.04 * (1.0 - 1e-6);
        let near = zabr_volatility(&params, &ctx, strike, ZabrEvaluation::ShortMaturityNormal);
        assert_relative_eq!(near, atm, max_relative = 1e-4);
    }

    #[test]
    fn test_gamma_one_matches_sabr_leading_order() {
        // gamma = 1 and beta = 1 reduce the expansion to the closed-form SABR chi(z)
        let (alpha, nu, rho) = (0.25, 0.6, -0.4);
        let params = ZabrParams::new(alpha, 1.0, nu, rho, 1.0);
        let ctx = MarketContext::new(1.0, 100.0).unwrap();

        for strike in [60.0, 80.0, 95.0, 110.0, 150.0] {
            let vol = zabr_volatility(&params, &ctx, strike, ZabrEvaluation::ShortMaturityLognormal);
            let expected = sabr_lognormal_beta_one(100.0, strike, alpha, nu, rho);
            assert_relative_eq!(vol, expected, max_relative = 1e-7);
        }
    }

    #[test]
    fn test_zero_vol_of_vol_is_cev() {
        // nu = 0 gives dx/dy = 1, so with beta = 1 the smile is flat at alpha
        let params = ZabrParams::new(0.3, 1.0, 0.0, 0.0, 1.7);
        let ctx = MarketContext::new(2.0, 1.0).unwrap();
        for strike in [0.5, 0.8, 1.2, 2.0] {
            let vol = zabr_volatility(&params, &ctx, strike, ZabrEvaluation::ShortMaturityLognormal);
            assert_relative_eq!(vol, 0.3, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_negative_rho_produces_downward_skew() {
        let params = ZabrParams::new(0.02, 0.7, 0.5, -0.5, 1.0);
        let ctx = context();
        let low = zabr_volatility(&params, &ctx, 0.02, ZabrEvaluation::ShortMaturityLognormal);
        let high = zabr_volatility(&params, &ctx, 0.06, ZabrEvaluation::ShortMaturityLognormal);
        assert!(low > high);
    }

    #[test]
    fn test_gamma_changes_wings() {
        let ctx = context();
        let sabr = ZabrParams::new(0.02, 0.5, 0.4, -0.2, 1.0);
        let zabr = ZabrParams { gamma: 1.5, ..sabr };
        let strike = 0.08;
        let v1 = zabr_volatility(&sabr, &ctx, strike, ZabrEvaluation::ShortMaturityLognormal);
        let v2 = zabr_volatility(&zabr, &ctx, strike, ZabrEvaluation::ShortMaturityLognormal);
        assert!(v1.is_finite() && v2.is_finite());
        assert!((v1 - v2).abs() > 1e-6);
    }

    #[test]
    fn test_normal_and_lognormal_consistent_near_atm() {
        // sigma_N ~ sigma_B * F near the money
        let params = ZabrParams::new(0.02, 0.5, 0.3, 0.1, 1.0);
        let ctx = context();
        let strike = 0.0401;
        let lognormal = zabr_volatility(&params, &ctx, strike, ZabrEvaluation::ShortMaturityLognormal);
        let normal = zabr_volatility(&params, &ctx, strike, ZabrEvaluation::ShortMaturityNormal);
        let ratio = (0.04 - strike) / (0.04 / strike).ln();
        assert_relative_eq!(normal, lognormal * ratio, max_relative = 1e-10);
    }

    // ========================================
    // Hagan Tests
    // ========================================

    #[test]
    fn test_hagan_atm() {
        let params = ZabrParams::new(0.2, 1.0, 0.4, -0.3, 1.0);
        let ctx = MarketContext::new(1.0, 100.0).unwrap();
        let vol = zabr_volatility(&params, &ctx, 100.0, ZabrEvaluation::HaganLognormal);
        // beta = 1: alpha * (1 + (rho nu alpha / 4 + (2 - 3 rho^2) nu^2 / 24) T)
        let expected = 0.2 * (1.0 + (0.25 * -0.3 * 0.4 * 0.2 + (2.0 - 0.27) * 0.16 / 24.0));
        assert_relative_eq!(vol, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_hagan_ignores_gamma() {
        let params = ZabrParams::new(0.2, 0.6, 0.4, -0.3, 1.0);
        let other = ZabrParams { gamma: 2.5, ..params };
        let ctx = MarketContext::new(2.0, 100.0).unwrap();
        for strike in [80.0, 100.0, 120.0] {
            assert_eq!(
                zabr_volatility(&params, &ctx, strike, ZabrEvaluation::HaganLognormal),
                zabr_volatility(&other, &ctx, strike, ZabrEvaluation::HaganLognormal)
            );
        }
    }

    #[test]
    fn test_hagan_smile_shape() {
        let params = ZabrParams::new(0.2, 1.0, 0.4, -0.3, 1.0);
        let ctx = MarketContext::new(1.0, 100.0).unwrap();
        let atm = zabr_volatility(&params, &ctx, 100.0, ZabrEvaluation::HaganLognormal);
        let otm_put = zabr_volatility(&params, &ctx, 80.0, ZabrEvaluation::HaganLognormal);
        assert!(otm_put > atm);
    }

    #[test]
    fn test_evaluation_labels() {
        assert_eq!(ZabrEvaluation::default(), ZabrEvaluation::ShortMaturityLognormal);
        assert!(ZabrEvaluation::ShortMaturityNormal.is_normal());
        assert!(!ZabrEvaluation::HaganLognormal.is_normal());
        assert_eq!(ZabrEvaluation::HaganLognormal.as_str(), "hagan_lognormal");
    }

    #[test]
    fn test_evaluation_from_str() {
        for evaluation in [
            ZabrEvaluation::ShortMaturityLognormal,
            ZabrEvaluation::ShortMaturityNormal,
            ZabrEvaluation::HaganLognormal,
        ] {
            assert_eq!(evaluation.to_string().parse::<ZabrEvaluation>().unwrap(), evaluation);
        }
        assert_eq!(
            "Short-Maturity-Normal".parse::<ZabrEvaluation>().unwrap(),
            ZabrEvaluation::ShortMaturityNormal
        );
        assert!("black".parse::<ZabrEvaluation>().unwrap_err().is_input_error());
    }
}
