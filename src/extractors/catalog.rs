// src/extractors/catalog.rs
//
// Built-in field sets for the request/analysis document the form tool fills.
// Deployments with other templates pass their own JSON catalog instead.

use super::dictionary::LabelDictionary;
use super::field_set::{Catalog, FieldSet};
use super::template::TableShapeTemplate;
use crate::utils::error::ConfigError;

// Tier weights: compound concepts, section-specific words, generic words
const COMPOUND: f64 = 10.0;
const SPECIFIC: f64 = 3.0;
const GENERIC: f64 = 1.0;

pub const REQUEST_INFO: &str = "talep_bilgileri";
pub const PURPOSE: &str = "amac";
pub const CURRENT_STATE: &str = "mevcut_durum";
pub const SCOPE: &str = "kapsam";
pub const RISK_ASSESSMENT: &str = "risk_degerlendirmesi";
pub const STAKEHOLDERS: &str = "paydaslar";

pub fn builtin() -> Result<Catalog, ConfigError> {
    Catalog::new(vec![
        request_info(),
        purpose(),
        current_state(),
        scope(),
        risk_assessment(),
        stakeholders(),
    ])
}

fn request_info() -> FieldSet {
    FieldSet::new(REQUEST_INFO, ["Talep Bilgileri", "Talep Künyesi", "Genel Bilgiler"])
        .with_dictionary(
            LabelDictionary::new()
                .with("talep_no", ["Talep No", "Talep Numarası", "Talep Kodu"])
                .with("talep_adi", ["Talep Adı", "Talep Başlığı", "Proje Adı"])
                .with("talep_eden", ["Talep Eden", "Talep Sahibi", "Talep Eden Kişi"])
                .with("talep_eden_birim", ["Talep Eden Birim", "Talep Eden Departman"])
                .with("talep_tarihi", ["Talep Tarihi", "Oluşturma Tarihi"])
                .with("oncelik", ["Öncelik", "Öncelik Derecesi"])
                .with("hedef_tarih", ["Hedef Tarih", "İstenen Teslim Tarihi"]),
        )
        .with_template(TableShapeTemplate::label_value())
        .with_template(TableShapeTemplate::double_label_value())
}

fn purpose() -> FieldSet {
    FieldSet::new(PURPOSE, ["Talebin Amacı", "Amaç", "Projenin Amacı", "İş Hedefi"])
        .with_tier(COMPOUND, ["talebin amacı", "iş hedefi", "projenin amacı", "beklenen fayda"])
        .with_tier(SPECIFIC, ["amaç", "hedef", "fayda", "kazanım", "verimlilik"])
        .with_tier(GENERIC, ["sağlamak", "artırmak", "iyileştirmek"])
        .with_blacklist(["kapsam dışı", "risk analizi", "mevcut durumda"])
}

fn current_state() -> FieldSet {
    FieldSet::new(CURRENT_STATE, ["Mevcut Durum", "Mevcut Süreç", "As-Is"])
        .with_tier(COMPOUND, ["mevcut durum", "mevcut süreç", "mevcut sistem", "manuel olarak"])
        .with_tier(SPECIFIC, ["şu anda", "halihazırda", "yapılmaktadır", "sorun"])
        .with_tier(GENERIC, ["süreç", "ekran", "kullanıcı"])
        .with_blacklist(["talebin amacı", "kapsam dışı", "risk analizi"])
}

fn scope() -> FieldSet {
    FieldSet::new(SCOPE, ["Kapsam", "Proje Kapsamı", "Kapsam ve Sınırlar"])
        .with_tier(COMPOUND, ["kapsam dahilinde", "kapsam dışı", "proje kapsamı"])
        .with_tier(SPECIFIC, ["kapsam", "dahil", "sınır", "modül"])
        .with_tier(GENERIC, ["ekran", "rapor", "entegrasyon"])
        .with_blacklist(["talebin amacı", "mevcut durumda", "risk analizi"])
}

fn risk_assessment() -> FieldSet {
    FieldSet::new(RISK_ASSESSMENT, ["Risk Değerlendirmesi", "Risk Analizi", "Etki Analizi"])
        .with_dictionary(
            LabelDictionary::new()
                .with("kisisel_veri", ["Kişisel veri işleniyor mu", "KVKK kapsamında veri var mı"])
                .with("dis_servis", ["Dış servis kullanılıyor mu", "Üçüncü taraf entegrasyonu var mı"])
                .with("yasal_duzenleme", ["Yasal düzenleme gerektiriyor mu", "Mevzuat etkisi var mı"])
                .with("musteri_etkisi", ["Müşteriye etkisi var mı", "Müşteri deneyimi etkileniyor mu"])
                .with("performans_etkisi", ["Performans etkisi var mı", "Sistem yükü artıyor mu"]),
        )
        .with_template(TableShapeTemplate::question_answer())
        .with_tier(COMPOUND, ["risk analizi", "etki analizi", "kişisel veri"])
        .with_tier(SPECIFIC, ["risk", "etki", "olasılık"])
        .with_blacklist(["talebin amacı", "kapsam dışı"])
}

fn stakeholders() -> FieldSet {
    FieldSet::new(STAKEHOLDERS, ["Paydaşlar", "Proje Ekibi", "İlgili Kişiler"])
        .with_dictionary(
            LabelDictionary::new()
                .with("is_birimi_sorumlusu", ["İş Birimi Sorumlusu", "İş Sahibi"])
                .with("is_analisti", ["İş Analisti", "Analist"])
                .with("proje_yoneticisi", ["Proje Yöneticisi", "PM"])
                .with("yazilim_sorumlusu", ["Yazılım Sorumlusu", "Geliştirici"])
                .with("test_sorumlusu", ["Test Sorumlusu", "Test Uzmanı"]),
        )
        .with_template(TableShapeTemplate::label_value())
        .with_template(TableShapeTemplate::double_label_value())
        .with_header_tokens(["Rol", "Ad Soyad", "Görev"])
}
