use super::{
    collision::{AbsoluteCollider, Collider, StaticBody},
    layers,
};
use bevy::{prelude::*, utils::hashbrown::HashMap};

#[derive(Debug, Clone, Copy)]
pub struct SpatialData<D> {
    pub entity: Entity,
    pub collider: AbsoluteCollider,
    pub data: D,
}

impl<D> SpatialData<D> {
    pub fn from_entity(
        entity: Entity,
        transform: &GlobalTransform,
        collider: &Collider,
        data: D,
    ) -> Self {
        Self {
            collider: collider.global_absolute(transform),
            entity,
            data,
        }
    }
}

/// Buckets colliders into square cells so lookups only touch nearby objects.
#[derive(Debug, Component)]
pub struct SpatialHash<D> {
    cell_size: f32,
    objects: HashMap<(i32, i32), Vec<SpatialData<D>>>,
}

impl<D: Clone> SpatialHash<D> {
    pub fn new(cell_size: f32) -> Self {
        SpatialHash {
            cell_size,
            objects: HashMap::default(),
        }
    }

    pub fn new_with(cell_size: f32, data: impl IntoIterator<Item = SpatialData<D>>) -> Self {
        let mut slf = Self::new(cell_size);
        data.into_iter().for_each(|d| slf.insert(d));
        slf
    }

    fn hash(&self, position: &Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Adds `data` to every cell its collider overlaps.
    pub fn insert(&mut self, data: SpatialData<D>) {
        let (min_x, min_y) = self.hash(&Vec2::new(data.collider.min_x(), data.collider.min_y()));
        let (max_x, max_y) = self.hash(&Vec2::new(data.collider.max_x(), data.collider.max_y()));

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.objects.entry((x, y)).or_default().push(data.clone());
            }
        }
    }

    pub fn remove_entity(&mut self, entity: Entity) {
        for cell in self.objects.values_mut() {
            cell.retain(|d| d.entity != entity);
        }
        self.objects.retain(|_, cell| !cell.is_empty());
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in the cell containing `position` and its eight neighbours.
    ///
    /// Large colliders appear in several cells, so an entity can be yielded more than once.
    pub fn nearby_objects<'a>(
        &'a self,
        position: &Vec2,
    ) -> impl Iterator<Item = &'a SpatialData<D>> + 'a {
        let cell = self.hash(position);

        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.objects
                    .get(&(cell.0 + dx, cell.1 + dy))
                    .into_iter()
                    .flatten()
            })
        })
    }
}

#[derive(Component)]
pub struct StaticBodyStorage;

pub type StaticBodyData = ();

pub fn init_static_body_storage(mut commands: Commands) {
    commands.spawn((
        SpatialHash::<StaticBodyData>::new(32.),
        StaticBodyStorage,
        layers::Wall,
    ));
}

pub fn store_static_body_in_spatial_map(
    map: Option<Single<&mut SpatialHash<StaticBodyData>, With<StaticBodyStorage>>>,
    static_body: Query<(Entity, &GlobalTransform, &Collider), Added<StaticBody>>,
) {
    let Some(map) = map else {
        return;
    };

    let mut map = map.into_inner();
    for (entity, transform, collider) in static_body.iter() {
        map.insert(SpatialData::from_entity(entity, transform, collider, ()));
    }
}

pub fn remove_static_body_from_spatial_map(
    map: Option<Single<&mut SpatialHash<StaticBodyData>, With<StaticBodyStorage>>>,
    mut removed: RemovedComponents<StaticBody>,
) {
    let Some(map) = map else {
        return;
    };

    let mut map = map.into_inner();
    for entity in removed.read() {
        map.remove_entity(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(entity: Entity, tl: Vec2, size: Vec2) -> SpatialData<()> {
        SpatialData {
            entity,
            collider: AbsoluteCollider { tl, size },
            data: (),
        }
    }

    #[test]
    fn removed_entities_are_no_longer_nearby() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        let mut hash = SpatialHash::new_with(
            32.,
            [
                data(a, Vec2::new(0., 16.), Vec2::splat(16.)),
                data(b, Vec2::new(8., 16.), Vec2::splat(16.)),
            ],
        );

        hash.remove_entity(a);
        let nearby = hash
            .nearby_objects(&Vec2::new(4., 4.))
            .map(|d| d.entity)
            .collect::<Vec<_>>();

        assert!(!nearby.contains(&a));
        assert!(nearby.contains(&b));
    }
}
