// Static translation catalog
use crate::application::translator::{Language, Translator};

/// Catalog-backed translator. Lookup order: requested language, then
/// English, then the key itself so a missing entry degrades to something
/// visible instead of an empty string.
pub struct StaticTranslations;

impl Translator for StaticTranslations {
    fn translate(&self, language: Language, key: &str) -> String {
        let localized = match language {
            Language::English => None,
            Language::Hindi => hindi(key),
        };

        localized
            .or_else(|| english(key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }
}

fn english(key: &str) -> Option<&'static str> {
    let text = match key {
        // Parameters
        "pH" => "pH Level",
        "TDS" => "TDS",
        "Temperature" => "Temperature",

        // Status and conditions
        "good" => "Good",
        "moderate" => "Moderate",
        "poor" => "Poor",
        "notMonitoring" => "Not monitoring",
        "optimalLevel" => "Optimal level",
        "attentionNeeded" => "Attention needed",
        "actionRequired" => "Action required",

        // Alerts
        "alertPhOutsideRange" => "is outside the optimal range of 6.5-8.5",
        "alertTdsHigh" => "is high - filtration recommended",
        "alertTdsModerate" => "is moderate - monitor closely",
        "alertTemperatureOutsideRange" => "is outside optimal range",
        "errorLoadingWaterQualityData" => "Error loading water quality data",

        // Recommendations
        "pHRecommendationAcidic" => {
            "The pH level is too acidic. Consider adding alkaline additives to neutralize the water."
        }
        "pHRecommendationAlkaline" => {
            "The pH level is too alkaline. Consider adding acid neutralizers to balance the water."
        }
        "pHRecommendationNormal" => {
            "The pH level is within the optimal range. Continue to monitor for any changes."
        }
        "tdsRecommendationLow" => {
            "The TDS level is excellent. Continue to monitor for any significant changes."
        }
        "tdsRecommendationModerate" => {
            "The TDS level is acceptable but moderate. Consider additional filtration if the level increases."
        }
        "tdsRecommendationHigh" => {
            "The TDS level is high. Water filtration is recommended to reduce the dissolved solids."
        }
        "tempRecommendationLow" => {
            "The water temperature is low. Consider raising the temperature for optimal ecosystem health."
        }
        "tempRecommendationHigh" => {
            "The water temperature is high. Consider methods to cool the water to prevent stress on aquatic life."
        }
        "tempRecommendationNormal" => {
            "The water temperature is within the optimal range. Continue to monitor for any changes."
        }
        _ => return None,
    };
    Some(text)
}

fn hindi(key: &str) -> Option<&'static str> {
    let text = match key {
        "pH" => "पीएच स्तर",
        "TDS" => "टीडीएस",
        "Temperature" => "तापमान",
        "good" => "अच्छा",
        "moderate" => "मध्यम",
        "poor" => "खराब",
        "attentionNeeded" => "ध्यान देने की आवश्यकता",
        "pHRecommendationAcidic" => {
            "पीएच स्तर बहुत अम्लीय है। पानी को निष्प्रभावित करने के लिए क्षारीय योज्य पदार्थ जोड़ने पर विचार करें।"
        }
        "pHRecommendationAlkaline" => {
            "पीएच स्तर बहुत क्षारीय है। पानी को संतुलित करने के लिए अम्ल निष्प्रभावकों को जोड़ने पर विचार करें।"
        }
        "pHRecommendationNormal" => {
            "पीएच स्तर इष्टतम सीमा के भीतर है। किसी भी परिवर्तन की निगरानी जारी रखें।"
        }
        "tdsRecommendationLow" => {
            "टीडीएस स्तर उत्कृष्ट है। किसी भी महत्वपूर्ण परिवर्तन की निगरानी जारी रखें।"
        }
        "tdsRecommendationModerate" => {
            "टीडीएस स्तर स्वीकार्य लेकिन मध्यम है। यदि स्तर बढ़ता है तो अतिरिक्त फ़िल्टरेशन पर विचार करें।"
        }
        "tdsRecommendationHigh" => {
            "टीडीएस स्तर उच्च है। घुले हुए ठोस पदार्थों को कम करने के लिए पानी का फ़िल्टरेशन की सिफारिश की जाती है।"
        }
        "tempRecommendationLow" => {
            "पानी का तापमान कम है। इष्टतम पारिस्थितिकी तंत्र स्वास्थ्य के लिए तापमान बढ़ाने पर विचार करें।"
        }
        "tempRecommendationHigh" => {
            "पानी का तापमान उच्च है। जलीय जीवन पर तनाव को रोकने के लिए पानी को ठंडा करने के तरीकों पर विचार करें।"
        }
        "tempRecommendationNormal" => {
            "पानी का तापमान इष्टतम सीमा के भीतर है। किसी भी परिवर्तन की निगरानी जारी रखें।"
        }
        _ => return None,
    };
    Some(text)
}
