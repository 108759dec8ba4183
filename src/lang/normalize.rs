//! Script-variant text normalization
//!
//! Both Chinese variants are fetched through the single canonical `zh`
//! edition; the returned summary is then converted into the requested
//! script. Conversion is character-table driven and intentionally partial:
//! characters without a table entry pass through unchanged, and callers
//! degrade to the unconverted text when normalization fails outright.

use crate::lang::ScriptVariant;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during script normalization
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("No conversion table for variant {0:?}")]
    UnsupportedVariant(ScriptVariant),
}

/// Converts text into a requested script variant
///
/// Implementations may be partial or backed by an external converter; a
/// returned error must never fail the surrounding term, only degrade the
/// result to the unconverted text.
pub trait VariantNormalizer: Send + Sync {
    fn normalize(&self, text: &str, variant: ScriptVariant) -> Result<String, NormalizeError>;
}

/// Common Simplified/Traditional character pairs, `(simplified, traditional)`.
///
/// Covers frequent single-character mappings; ambiguous many-to-one
/// characters are left out and pass through untouched.
const CHAR_PAIRS: &[(char, char)] = &[
    ('万', '萬'),
    ('与', '與'),
    ('专', '專'),
    ('两', '兩'),
    ('严', '嚴'),
    ('个', '個'),
    ('临', '臨'),
    ('为', '為'),
    ('举', '舉'),
    ('义', '義'),
    ('乐', '樂'),
    ('书', '書'),
    ('买', '買'),
    ('乱', '亂'),
    ('争', '爭'),
    ('于', '於'),
    ('亚', '亞'),
    ('产', '產'),
    ('亲', '親'),
    ('亿', '億'),
    ('从', '從'),
    ('众', '眾'),
    ('优', '優'),
    ('传', '傳'),
    ('伤', '傷'),
    ('体', '體'),
    ('来', '來'),
    ('侧', '側'),
    ('俩', '倆'),
    ('们', '們'),
    ('价', '價'),
    ('会', '會'),
    ('伟', '偉'),
    ('儿', '兒'),
    ('党', '黨'),
    ('内', '內'),
    ('写', '寫'),
    ('军', '軍'),
    ('农', '農'),
    ('冯', '馮'),
    ('决', '決'),
    ('况', '況'),
    ('净', '淨'),
    ('准', '準'),
    ('几', '幾'),
    ('凤', '鳳'),
    ('刘', '劉'),
    ('则', '則'),
    ('刚', '剛'),
    ('创', '創'),
    ('动', '動'),
    ('务', '務'),
    ('劳', '勞'),
    ('势', '勢'),
    ('区', '區'),
    ('医', '醫'),
    ('单', '單'),
    ('卖', '賣'),
    ('压', '壓'),
    ('厂', '廠'),
    ('历', '歷'),
    ('县', '縣'),
    ('双', '雙'),
    ('变', '變'),
    ('号', '號'),
    ('听', '聽'),
    ('启', '啟'),
    ('员', '員'),
    ('问', '問'),
    ('图', '圖'),
    ('团', '團'),
    ('园', '園'),
    ('国', '國'),
    ('圆', '圓'),
    ('场', '場'),
    ('块', '塊'),
    ('坚', '堅'),
    ('报', '報'),
    ('声', '聲'),
    ('处', '處'),
    ('备', '備'),
    ('头', '頭'),
    ('夹', '夾'),
    ('夺', '奪'),
    ('奋', '奮'),
    ('妇', '婦'),
    ('学', '學'),
    ('宁', '寧'),
    ('实', '實'),
    ('宝', '寶'),
    ('对', '對'),
    ('寻', '尋'),
    ('导', '導'),
    ('将', '將'),
    ('尔', '爾'),
    ('层', '層'),
    ('岁', '歲'),
    ('岛', '島'),
    ('币', '幣'),
    ('师', '師'),
    ('带', '帶'),
    ('帮', '幫'),
    ('广', '廣'),
    ('庆', '慶'),
    ('应', '應'),
    ('开', '開'),
    ('异', '異'),
    ('张', '張'),
    ('录', '錄'),
    ('忆', '憶'),
    ('态', '態'),
    ('总', '總'),
    ('恋', '戀'),
    ('惊', '驚'),
    ('爱', '愛'),
    ('战', '戰'),
    ('击', '擊'),
    ('扩', '擴'),
    ('护', '護'),
    ('担', '擔'),
    ('据', '據'),
    ('换', '換'),
    ('无', '無'),
    ('旧', '舊'),
    ('时', '時'),
    ('显', '顯'),
    ('晋', '晉'),
    ('暂', '暫'),
    ('术', '術'),
    ('机', '機'),
    ('杀', '殺'),
    ('权', '權'),
    ('条', '條'),
    ('极', '極'),
    ('构', '構'),
    ('标', '標'),
    ('树', '樹'),
    ('样', '樣'),
    ('检', '檢'),
    ('汉', '漢'),
    ('沟', '溝'),
    ('泪', '淚'),
    ('泽', '澤'),
    ('济', '濟'),
    ('浅', '淺'),
    ('测', '測'),
    ('满', '滿'),
    ('灭', '滅'),
    ('灯', '燈'),
    ('点', '點'),
    ('热', '熱'),
    ('牺', '犧'),
    ('犹', '猶'),
    ('独', '獨'),
    ('猫', '貓'),
    ('环', '環'),
    ('现', '現'),
    ('电', '電'),
    ('画', '畫'),
    ('疗', '療'),
    ('盖', '蓋'),
    ('监', '監'),
    ('确', '確'),
    ('礼', '禮'),
    ('离', '離'),
    ('种', '種'),
    ('称', '稱'),
    ('竞', '競'),
    ('笔', '筆'),
    ('简', '簡'),
    ('类', '類'),
    ('粮', '糧'),
    ('紧', '緊'),
    ('纪', '紀'),
    ('红', '紅'),
    ('级', '級'),
    ('纸', '紙'),
    ('细', '細'),
    ('织', '織'),
    ('终', '終'),
    ('经', '經'),
    ('结', '結'),
    ('给', '給'),
    ('统', '統'),
    ('继', '繼'),
    ('续', '續'),
    ('维', '維'),
    ('编', '編'),
    ('网', '網'),
    ('罗', '羅'),
    ('习', '習'),
    ('联', '聯'),
    ('胜', '勝'),
    ('脑', '腦'),
    ('艺', '藝'),
    ('节', '節'),
    ('蓝', '藍'),
    ('虽', '雖'),
    ('见', '見'),
    ('观', '觀'),
    ('规', '規'),
    ('视', '視'),
    ('觉', '覺'),
    ('计', '計'),
    ('认', '認'),
    ('讲', '講'),
    ('许', '許'),
    ('论', '論'),
    ('设', '設'),
    ('访', '訪'),
    ('证', '證'),
    ('译', '譯'),
    ('试', '試'),
    ('话', '話'),
    ('诗', '詩'),
    ('语', '語'),
    ('说', '說'),
    ('请', '請'),
    ('读', '讀'),
    ('调', '調'),
    ('贝', '貝'),
    ('负', '負'),
    ('贡', '貢'),
    ('财', '財'),
    ('责', '責'),
    ('贵', '貴'),
    ('费', '費'),
    ('资', '資'),
    ('赛', '賽'),
    ('车', '車'),
    ('转', '轉'),
    ('轮', '輪'),
    ('软', '軟'),
    ('轻', '輕'),
    ('边', '邊'),
    ('达', '達'),
    ('过', '過'),
    ('运', '運'),
    ('进', '進'),
    ('远', '遠'),
    ('违', '違'),
    ('连', '連'),
    ('迟', '遲'),
    ('选', '選'),
    ('递', '遞'),
    ('逻', '邏'),
    ('长', '長'),
    ('门', '門'),
    ('间', '間'),
    ('闻', '聞'),
    ('阳', '陽'),
    ('阴', '陰'),
    ('陆', '陸'),
    ('际', '際'),
    ('陈', '陳'),
    ('险', '險'),
    ('难', '難'),
    ('雾', '霧'),
    ('页', '頁'),
    ('顶', '頂'),
    ('项', '項'),
    ('顺', '順'),
    ('须', '須'),
    ('预', '預'),
    ('领', '領'),
    ('题', '題'),
    ('风', '風'),
    ('飞', '飛'),
    ('饭', '飯'),
    ('马', '馬'),
    ('驯', '馴'),
    ('驾', '駕'),
    ('骑', '騎'),
    ('验', '驗'),
    ('鱼', '魚'),
    ('鸟', '鳥'),
    ('鸡', '雞'),
    ('黄', '黃'),
    ('齐', '齊'),
    ('龙', '龍'),
];

/// Table-driven Simplified/Traditional converter
pub struct TableNormalizer {
    to_simplified: HashMap<char, char>,
    to_traditional: HashMap<char, char>,
}

impl TableNormalizer {
    pub fn new() -> Self {
        let mut to_simplified = HashMap::with_capacity(CHAR_PAIRS.len());
        let mut to_traditional = HashMap::with_capacity(CHAR_PAIRS.len());
        for &(simplified, traditional) in CHAR_PAIRS {
            to_simplified.insert(traditional, simplified);
            to_traditional.insert(simplified, traditional);
        }
        Self {
            to_simplified,
            to_traditional,
        }
    }
}

impl Default for TableNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantNormalizer for TableNormalizer {
    fn normalize(&self, text: &str, variant: ScriptVariant) -> Result<String, NormalizeError> {
        let table = match variant {
            ScriptVariant::Simplified => &self.to_simplified,
            ScriptVariant::Traditional => &self.to_traditional,
        };
        Ok(text
            .chars()
            .map(|c| *table.get(&c).unwrap_or(&c))
            .collect())
    }
}
