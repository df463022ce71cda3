use lazy_static::lazy_static;

use crate::models::Category;

fn category(type_id: i64, type_name: &str, type_en: &str, type_pid: i64) -> Category {
    Category {
        type_id,
        type_name: type_name.to_string(),
        type_en: type_en.to_string(),
        type_pid,
        type_sort: type_id,
        type_status: 1,
        children: None,
    }
}

lazy_static! {
    /// Catalog taxonomy, primary categories first
    pub static ref ALL_CATEGORIES: Vec<Category> = vec![
        // Primary
        category(1, "电视剧", "tv", 0),
        category(2, "电影", "movie", 0),
        category(8, "伦理片", "ethics", 0),
        category(17, "动漫", "anime", 0),
        category(27, "综艺", "variety", 0),
        category(29, "体育赛事", "sports", 0),
        category(38, "短剧", "short-drama", 0),
        category(39, "预告片", "trailer", 0),
        // TV
        category(3, "欧美剧", "western-tv", 1),
        category(4, "香港剧", "hk-tv", 1),
        category(5, "韩剧", "korean-tv", 1),
        category(6, "日剧", "japanese-tv", 1),
        category(7, "马泰剧", "thai-tv", 1),
        category(20, "内地剧", "mainland-tv", 1),
        category(28, "台湾剧", "taiwan-tv", 1),
        // Movies
        category(9, "动作片", "action", 2),
        category(10, "爱情片", "romance", 2),
        category(11, "喜剧片", "comedy", 2),
        category(12, "科幻片", "sci-fi", 2),
        category(13, "恐怖片", "horror", 2),
        category(14, "剧情片", "drama", 2),
        category(15, "战争片", "war", 2),
        category(16, "记录片", "documentary", 2),
        category(23, "动画片", "animation", 2),
        category(34, "灾难片", "disaster", 2),
        category(35, "悬疑片", "mystery", 2),
        category(36, "犯罪片", "crime", 2),
        category(37, "奇幻片", "fantasy", 2),
        // Anime
        category(24, "中国动漫", "chinese-anime", 17),
        category(25, "日本动漫", "japanese-anime", 17),
        category(26, "欧美动漫", "western-anime", 17),
        // Variety
        category(30, "内地综艺", "mainland-variety", 27),
        category(31, "港台综艺", "hk-tw-variety", 27),
        category(32, "日韩综艺", "jp-kr-variety", 27),
        category(33, "欧美综艺", "western-variety", 27),
    ];
}

/// Categories shown in the navigation bar
const NAVIGATION_IDS: &[i64] = &[1, 2, 17, 27, 38];

pub fn navigation_categories() -> Vec<Category> {
    NAVIGATION_IDS
        .iter()
        .filter_map(|id| category_by_id(*id))
        .collect()
}

pub fn sub_categories(parent_id: i64) -> Vec<Category> {
    ALL_CATEGORIES
        .iter()
        .filter(|c| c.type_pid == parent_id)
        .cloned()
        .collect()
}

pub fn category_by_id(type_id: i64) -> Option<Category> {
    ALL_CATEGORIES.iter().find(|c| c.type_id == type_id).cloned()
}

pub fn category_by_en(type_en: &str) -> Option<Category> {
    ALL_CATEGORIES.iter().find(|c| c.type_en == type_en).cloned()
}

/// Primary categories with their children attached
pub fn build_category_tree() -> Vec<Category> {
    ALL_CATEGORIES
        .iter()
        .filter(|c| c.type_pid == 0)
        .map(|parent| {
            let children = sub_categories(parent.type_id);
            Category {
                children: (!children.is_empty()).then_some(children),
                ..parent.clone()
            }
        })
        .collect()
}

/// Type ids a listing of `type_id` covers: a primary category includes
/// its children
pub fn type_ids_with_children(type_id: i64) -> Vec<i64> {
    let mut ids = vec![type_id];
    if category_by_id(type_id).map_or(false, |c| c.type_pid == 0) {
        ids.extend(sub_categories(type_id).iter().map(|c| c.type_id));
    }
    ids
}
