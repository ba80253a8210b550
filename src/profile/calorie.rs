use crate::profile::dto::{ActivityLevel, Gender, Goal, OnboardingRequest};

/// Basal metabolic rate via the Mifflin-St Jeor equation, in kcal/day.
pub fn bmr(weight_kg: f64, height_cm: f64, age: i32, gender: Gender) -> i32 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let adjusted = match gender {
        Gender::Male => base + 5.0,
        Gender::Female | Gender::Other => base - 161.0,
    };
    adjusted.round() as i32
}

fn activity_factor(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Very => 1.725,
        ActivityLevel::Extreme => 1.9,
    }
}

/// Total daily energy expenditure: BMR scaled by the activity factor.
pub fn tdee(bmr: i32, level: ActivityLevel) -> i32 {
    (f64::from(bmr) * activity_factor(level)).round() as i32
}

/// Daily calorie target: a 500 kcal deficit or surplus tracks roughly
/// half a kilogram per week.
pub fn target_calories(tdee: i32, goal: Goal) -> i32 {
    match goal {
        Goal::Lose => tdee - 500,
        Goal::Maintain => tdee,
        Goal::Gain => tdee + 500,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroTargets {
    /// Grams per day.
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
    pub protein_calories: i32,
    pub carbs_calories: i32,
    pub fat_calories: i32,
}

/// Percentage split of the calorie target, converted to grams at
/// 4 kcal/g for protein and carbs, 9 kcal/g for fat.
pub fn macro_targets(target_calories: i32, goal: Goal) -> MacroTargets {
    let (protein_pct, carbs_pct, fat_pct) = match goal {
        // Higher protein preserves muscle during a deficit.
        Goal::Lose => (0.30, 0.40, 0.30),
        Goal::Gain => (0.25, 0.50, 0.25),
        Goal::Maintain => (0.25, 0.45, 0.30),
    };

    let target = f64::from(target_calories);
    let protein_calories = (target * protein_pct).round() as i32;
    let carbs_calories = (target * carbs_pct).round() as i32;
    let fat_calories = (target * fat_pct).round() as i32;

    MacroTargets {
        protein: (f64::from(protein_calories) / 4.0).round() as i32,
        carbs: (f64::from(carbs_calories) / 4.0).round() as i32,
        fat: (f64::from(fat_calories) / 9.0).round() as i32,
        protein_calories,
        carbs_calories,
        fat_calories,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileTargets {
    pub bmr: i32,
    pub tdee: i32,
    pub target_calories: i32,
    pub macros: MacroTargets,
}

pub fn profile_targets(req: &OnboardingRequest) -> ProfileTargets {
    let bmr = bmr(req.weight, req.height, req.age, req.gender);
    let tdee = tdee(bmr, req.activity_level);
    let target_calories = target_calories(tdee, req.goal);
    ProfileTargets {
        bmr,
        tdee,
        target_calories,
        macros: macro_targets(target_calories, req.goal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmr_mifflin_st_jeor() {
        // 10*70 + 6.25*175 - 5*25 + 5 = 1673.75
        assert_eq!(bmr(70.0, 175.0, 25, Gender::Male), 1674);
        // 10*60 + 6.25*165 - 5*30 - 161 = 1320.25
        assert_eq!(bmr(60.0, 165.0, 30, Gender::Female), 1320);
        assert_eq!(
            bmr(60.0, 165.0, 30, Gender::Other),
            bmr(60.0, 165.0, 30, Gender::Female)
        );
    }

    #[test]
    fn tdee_scales_bmr_by_activity() {
        assert_eq!(tdee(1674, ActivityLevel::Sedentary), 2009);
        assert_eq!(tdee(1674, ActivityLevel::Moderate), 2595);
        assert_eq!(tdee(1674, ActivityLevel::Extreme), 3181);
    }

    #[test]
    fn target_shifts_by_500_for_goal() {
        assert_eq!(target_calories(2500, Goal::Lose), 2000);
        assert_eq!(target_calories(2500, Goal::Maintain), 2500);
        assert_eq!(target_calories(2500, Goal::Gain), 3000);
    }

    #[test]
    fn macro_split_for_weight_loss() {
        let m = macro_targets(2000, Goal::Lose);
        assert_eq!(m.protein_calories, 600);
        assert_eq!(m.carbs_calories, 800);
        assert_eq!(m.fat_calories, 600);
        assert_eq!(m.protein, 150);
        assert_eq!(m.carbs, 200);
        assert_eq!(m.fat, 67);
    }

    #[test]
    fn full_profile_calculation() {
        let req = OnboardingRequest {
            age: 25,
            gender: Gender::Male,
            height: 175.0,
            weight: 70.0,
            goal_weight: Some(65.0),
            activity_level: ActivityLevel::Moderate,
            goal: Goal::Lose,
        };
        let t = profile_targets(&req);
        assert_eq!(t.bmr, 1674);
        assert_eq!(t.tdee, 2595);
        assert_eq!(t.target_calories, 2095);
        // 2095 * 0.30 = 628.5 -> 629 kcal -> 157 g
        assert_eq!(t.macros.protein, 157);
    }
}
