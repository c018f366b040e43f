//! Built-in tables used when the config file leaves a section out

use crate::config::types::LabelRule;
use crate::model::Field;

pub fn timeout_seconds() -> u64 {
    30
}

pub fn retry_backoff_ms() -> u64 {
    1000
}

pub fn max_concurrency() -> usize {
    5
}

pub fn database_path() -> String {
    "./companies.db".to_string()
}

pub fn report_path() -> String {
    "./harvest-report.md".to_string()
}

pub fn user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn info_block_keywords() -> Vec<String> {
    ["company-info", "corporate-info", "company-profile", "会社概要", "企業情報"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn contact_keywords() -> Vec<String> {
    ["contact", "inquiry", "toiawase", "お問い合わせ", "問い合わせ"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn label_rules() -> Vec<LabelRule> {
    vec![
        LabelRule::new("住所", Field::Address),
        LabelRule::new("所在地", Field::Address),
        LabelRule::new("本社所在地", Field::Address),
        LabelRule::new("address", Field::Address),
        LabelRule::new("head office", Field::Address),
        LabelRule::new("電話番号", Field::Tel),
        LabelRule::new("電話", Field::Tel),
        LabelRule::new("tel", Field::Tel),
        LabelRule::new("phone", Field::Tel),
        LabelRule::new("telephone", Field::Tel),
        LabelRule::new("fax", Field::Fax),
        LabelRule::new("ファックス", Field::Fax),
        LabelRule::new("代表者", Field::Representative),
        LabelRule::new("代表取締役", Field::Representative),
        LabelRule::new("代表", Field::Representative),
        LabelRule::new("representative", Field::Representative),
        LabelRule::new("ceo", Field::Representative),
        LabelRule::new("president", Field::Representative),
        LabelRule::new("事業内容", Field::BusinessDescription),
        LabelRule::new("業務内容", Field::BusinessDescription),
        LabelRule::new("business description", Field::BusinessDescription),
        LabelRule::new("business", Field::BusinessDescription),
        LabelRule::new("設立年月日", Field::EstablishedDate),
        LabelRule::new("設立", Field::EstablishedDate),
        LabelRule::new("established", Field::EstablishedDate),
        LabelRule::new("founded", Field::EstablishedDate),
        LabelRule::new("資本金", Field::Capital),
        LabelRule::new("capital", Field::Capital),
    ]
}

/// Japanese prefectures, kanji first, then romanized forms
pub fn regions() -> Vec<String> {
    const KANJI: [&str; 47] = [
        "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県", "茨城県", "栃木県",
        "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県", "新潟県", "富山県", "石川県",
        "福井県", "山梨県", "長野県", "岐阜県", "静岡県", "愛知県", "三重県", "滋賀県",
        "京都府", "大阪府", "兵庫県", "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県",
        "広島県", "山口県", "徳島県", "香川県", "愛媛県", "高知県", "福岡県", "佐賀県",
        "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
    ];
    const ROMANIZED: [&str; 47] = [
        "Hokkaido", "Aomori-ken", "Iwate-ken", "Miyagi-ken", "Akita-ken", "Yamagata-ken",
        "Fukushima-ken", "Ibaraki-ken", "Tochigi-ken", "Gunma-ken", "Saitama-ken", "Chiba-ken",
        "Tokyo-to", "Kanagawa-ken", "Niigata-ken", "Toyama-ken", "Ishikawa-ken", "Fukui-ken",
        "Yamanashi-ken", "Nagano-ken", "Gifu-ken", "Shizuoka-ken", "Aichi-ken", "Mie-ken",
        "Shiga-ken", "Kyoto-fu", "Osaka-fu", "Hyogo-ken", "Nara-ken", "Wakayama-ken",
        "Tottori-ken", "Shimane-ken", "Okayama-ken", "Hiroshima-ken", "Yamaguchi-ken",
        "Tokushima-ken", "Kagawa-ken", "Ehime-ken", "Kochi-ken", "Fukuoka-ken", "Saga-ken",
        "Nagasaki-ken", "Kumamoto-ken", "Oita-ken", "Miyazaki-ken", "Kagoshima-ken",
        "Okinawa-ken",
    ];
    KANJI
        .iter()
        .chain(ROMANIZED.iter())
        .map(|s| s.to_string())
        .collect()
}

pub fn locality_suffixes() -> Vec<String> {
    ["市", "区", "町", "村", "-shi", "-ku", "-machi", "-cho", "-mura", "-son"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
