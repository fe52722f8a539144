use serde::{Deserialize, Serialize};

use super::item::{ActiveItem, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneStatus {
    #[default]
    Idle,
    Running,
}

/// One horizontal track. Items are kept in insertion order; the last one is the trailing edge.
#[derive(Debug, Clone, Default)]
pub struct Lane {
    pub index: usize,
    pub status: LaneStatus,
    items: Vec<ActiveItem>,
}

impl Lane {
    fn new(index: usize) -> Self {
        Self {
            index,
            status: LaneStatus::Idle,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[ActiveItem] {
        &self.items
    }

    /// Most recently added item
    pub fn trailing(&self) -> Option<&ActiveItem> {
        self.items.last()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fixed set of lanes created once per scheduler
#[derive(Debug, Clone, Default)]
pub struct LanePool {
    lanes: Vec<Lane>,
}

impl LanePool {
    pub fn new(count: usize) -> Self {
        Self {
            lanes: (0..count).map(Lane::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn get(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    /// Flip an idle lane to running ahead of insertion
    pub fn reserve(&mut self, index: usize) {
        if let Some(lane) = self.lanes.get_mut(index) {
            lane.status = LaneStatus::Running;
        }
    }

    pub fn push(&mut self, item: ActiveItem) {
        if let Some(lane) = self.lanes.get_mut(item.lane) {
            lane.status = LaneStatus::Running;
            lane.items.push(item);
        }
    }

    /// Remove an item from whichever lane holds it. A lane left empty goes idle.
    pub fn remove(&mut self, id: &ItemId) -> Option<ActiveItem> {
        for lane in &mut self.lanes {
            if let Some(pos) = lane.items.iter().position(|item| &item.id == id) {
                let item = lane.items.remove(pos);
                if lane.items.is_empty() {
                    lane.status = LaneStatus::Idle;
                }
                return Some(item);
            }
        }
        None
    }

    pub fn find(&self, id: &ItemId) -> Option<&ActiveItem> {
        self.iter().find(|item| &item.id == id)
    }

    pub fn find_mut(&mut self, id: &ItemId) -> Option<&mut ActiveItem> {
        self.lanes
            .iter_mut()
            .flat_map(|lane| lane.items.iter_mut())
            .find(|item| &item.id == id)
    }

    /// All items, lane order then insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ActiveItem> {
        self.lanes.iter().flat_map(|lane| lane.items.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveItem> {
        self.lanes.iter_mut().flat_map(|lane| lane.items.iter_mut())
    }

    pub fn running_count(&self) -> usize {
        self.lanes
            .iter()
            .filter(|lane| lane.status == LaneStatus::Running)
            .count()
    }

    pub fn occupied_count(&self) -> usize {
        self.lanes.iter().filter(|lane| !lane.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(lane: usize) -> ActiveItem {
        ActiveItem::new("hello".into(), 50.0, 10.0, lane)
    }

    #[test]
    fn test_push_and_remove_keep_status_in_sync() {
        let mut pool = LanePool::new(3);
        let a = item(1);
        let b = item(1);
        let (a_id, b_id) = (a.id, b.id);
        pool.push(a);
        pool.push(b);
        assert_eq!(pool.running_count(), 1);
        assert_eq!(pool.get(1).unwrap().trailing().unwrap().id, b_id);

        pool.remove(&a_id);
        assert_eq!(pool.get(1).unwrap().status, LaneStatus::Running);
        pool.remove(&b_id);
        assert_eq!(pool.get(1).unwrap().status, LaneStatus::Idle);
        assert_eq!(pool.running_count(), pool.occupied_count());
    }

    #[test]
    fn test_iter_is_lane_then_insertion_order() {
        let mut pool = LanePool::new(2);
        let first = item(1);
        let second = item(0);
        let third = item(1);
        let expected = vec![second.id, first.id, third.id];
        pool.push(first);
        pool.push(second);
        pool.push(third);
        let ids: Vec<ItemId> = pool.iter().map(|i| i.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut pool = LanePool::new(1);
        assert!(pool.remove(&ItemId::new()).is_none());
    }
}
